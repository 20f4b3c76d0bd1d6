use std::fmt;

use serde::Serialize;

/// States of a pipeline run, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Generate,
    Connect,
    Load,
    Staging,
    Marts,
    QualityGate,
    Export,
    Done,
}

impl PipelineStage {
    /// Working states, excluding `Done`.
    pub const STEPS: [PipelineStage; 7] = [
        PipelineStage::Generate,
        PipelineStage::Connect,
        PipelineStage::Load,
        PipelineStage::Staging,
        PipelineStage::Marts,
        PipelineStage::QualityGate,
        PipelineStage::Export,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStage::Generate => "generate",
            PipelineStage::Connect => "connect",
            PipelineStage::Load => "load",
            PipelineStage::Staging => "staging",
            PipelineStage::Marts => "marts",
            PipelineStage::QualityGate => "quality_gate",
            PipelineStage::Export => "export",
            PipelineStage::Done => "done",
        }
    }

    /// Progress line shown when the state is entered.
    pub fn description(&self) -> &'static str {
        match self {
            PipelineStage::Generate => "Generating synthetic raw data",
            PipelineStage::Connect => "Connecting to warehouse",
            PipelineStage::Load => "Loading raw tables",
            PipelineStage::Staging => "Running staging SQL",
            PipelineStage::Marts => "Running mart SQL",
            PipelineStage::QualityGate => "Running quality checks",
            PipelineStage::Export => "Exporting marts and quality report",
            PipelineStage::Done => "Pipeline completed",
        }
    }

    /// 1-based position among [`PipelineStage::STEPS`]; `None` for `Done`.
    pub fn step(&self) -> Option<usize> {
        Self::STEPS
            .iter()
            .position(|stage| stage == self)
            .map(|index| index + 1)
    }

    pub fn next(&self) -> Option<PipelineStage> {
        match self {
            PipelineStage::Done => None,
            stage => Some(
                stage
                    .step()
                    .and_then(|step| Self::STEPS.get(step).copied())
                    .unwrap_or(PipelineStage::Done),
            ),
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn states_advance_linearly_to_done() {
        let mut visited = vec![PipelineStage::Generate];
        let mut current = PipelineStage::Generate;
        while let Some(next) = current.next() {
            visited.push(next);
            current = next;
        }
        assert_eq!(visited.len(), 8);
        assert_eq!(visited[..7], PipelineStage::STEPS);
        assert_eq!(current, PipelineStage::Done);
    }

    #[test]
    fn steps_are_one_based() {
        assert_eq!(PipelineStage::Generate.step(), Some(1));
        assert_eq!(PipelineStage::Export.step(), Some(7));
        assert_eq!(PipelineStage::Done.step(), None);
    }
}
