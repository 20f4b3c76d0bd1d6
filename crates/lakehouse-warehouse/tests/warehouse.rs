use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use lakehouse_core::schema::RAW_USERS;
use lakehouse_generate::{GenerationEngine, GeneratorConfig};
use lakehouse_warehouse::{
    MART_TABLES, TransformBatch, TransformStage, TransformUnit, Warehouse, WarehouseError,
    export_marts, load_raw_tables, load_table,
};

fn temp_dir(label: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "lakehouse_warehouse_{label}_{}",
        uuid::Uuid::new_v4()
    ));
    fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

fn sql_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../sql")
}

fn generate_raw(dir: &Path, n_users: i64) -> PathBuf {
    let anchor = NaiveDate::from_ymd_opt(2024, 9, 30)
        .and_then(|date| date.and_hms_opt(18, 30, 0))
        .expect("valid anchor");
    let config = GeneratorConfig {
        seed: 11,
        days_back: 30,
        n_users,
        avg_events_per_user: 5,
        avg_tickets_per_user: 0.2,
        anchor,
    };
    let raw_dir = dir.join("raw");
    GenerationEngine::new(config)
        .run(&raw_dir)
        .expect("generate raw tables");
    raw_dir
}

#[tokio::test]
async fn load_replaces_raw_tables() {
    let dir = temp_dir("load");
    let raw_dir = generate_raw(&dir, 20);
    let mut warehouse = Warehouse::open(&dir.join("warehouse.sqlite"), true)
        .await
        .expect("open warehouse");

    let first = load_raw_tables(warehouse.connection(), &raw_dir)
        .await
        .expect("first load");
    let second = load_raw_tables(warehouse.connection(), &raw_dir)
        .await
        .expect("second load");

    assert_eq!(first.len(), 4);
    assert_eq!(first[0].table, "raw_users");
    assert_eq!(first[0].rows, 20);
    for (before, after) in first.iter().zip(&second) {
        assert_eq!(before.rows, after.rows);
        let count = warehouse.row_count(&after.table).await.expect("count rows");
        assert_eq!(count as u64, after.rows, "{} replaced, not appended", after.table);
    }
    warehouse.close().await.expect("close warehouse");
}

#[tokio::test]
async fn malformed_file_leaves_table_untouched() {
    let dir = temp_dir("malformed");
    let raw_dir = generate_raw(&dir, 5);
    let mut warehouse = Warehouse::open(&dir.join("warehouse.sqlite"), true)
        .await
        .expect("open warehouse");
    load_raw_tables(warehouse.connection(), &raw_dir)
        .await
        .expect("initial load");

    let broken = dir.join("broken_users.csv");
    fs::write(
        &broken,
        "user_id,signup_ts,acquisition_channel,country,plan_tier,company_size\n\
         1,2024-09-01 10:00:00,organic,US,free,small\n\
         two,2024-09-02 10:00:00,referral,DE,pro,mid\n",
    )
    .expect("write broken file");

    let err = load_table(warehouse.connection(), &RAW_USERS, &broken)
        .await
        .unwrap_err();
    match err {
        WarehouseError::Load { table, message } => {
            assert_eq!(table, "raw_users");
            assert!(message.contains("line 3"), "{message}");
            assert!(message.contains("user_id"), "{message}");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(warehouse.row_count("raw_users").await.expect("count"), 5);
}

#[tokio::test]
async fn missing_required_value_is_rejected() {
    let dir = temp_dir("missing_value");
    let path = dir.join("users.csv");
    fs::write(
        &path,
        "user_id,signup_ts,acquisition_channel,country,plan_tier,company_size\n\
         1,,organic,US,free,small\n",
    )
    .expect("write file");
    let mut warehouse = Warehouse::open(&dir.join("warehouse.sqlite"), true)
        .await
        .expect("open warehouse");

    let err = load_table(warehouse.connection(), &RAW_USERS, &path)
        .await
        .unwrap_err();
    assert!(matches!(err, WarehouseError::Load { .. }));
    assert!(!warehouse.table_exists("raw_users").await.expect("lookup"));
}

#[tokio::test]
async fn scripts_run_in_file_name_order() {
    let dir = temp_dir("order");
    let scripts = dir.join("staging");
    fs::create_dir_all(&scripts).expect("create script dir");
    fs::write(
        scripts.join("02_insert.sql"),
        "insert into run_log (unit) values ('02_insert');",
    )
    .expect("write script");
    fs::write(
        scripts.join("01_create.sql"),
        "drop table if exists run_log;\ncreate table run_log (unit text not null);",
    )
    .expect("write script");
    fs::write(
        scripts.join("03_insert.sql"),
        "insert into run_log (unit) values ('03_insert');",
    )
    .expect("write script");

    let batch = TransformBatch::discover(TransformStage::Staging, &scripts).expect("discover");
    let mut warehouse = Warehouse::open(&dir.join("warehouse.sqlite"), true)
        .await
        .expect("open warehouse");
    let report = batch
        .execute(warehouse.connection())
        .await
        .expect("execute batch");

    let names: Vec<&str> = report.units.iter().map(|unit| unit.name.as_str()).collect();
    assert_eq!(names, vec!["01_create", "02_insert", "03_insert"]);
    let logged: Vec<String> = sqlx::query_scalar("select unit from run_log order by rowid")
        .fetch_all(warehouse.connection())
        .await
        .expect("read log");
    assert_eq!(logged, vec!["02_insert", "03_insert"]);
}

#[tokio::test]
async fn failing_unit_stops_the_batch() {
    let dir = temp_dir("failing");
    let batch = TransformBatch::new(
        TransformStage::Marts,
        vec![
            TransformUnit::new("01_ok", "create table first_unit (x integer);"),
            TransformUnit::new(
                "02_broken",
                "create table partial_unit (x integer);\ninsert into no_such_table values (1);",
            ),
            TransformUnit::new("03_never", "create table third_unit (x integer);"),
        ],
    );
    let mut warehouse = Warehouse::open(&dir.join("warehouse.sqlite"), true)
        .await
        .expect("open warehouse");

    let err = batch.execute(warehouse.connection()).await.unwrap_err();
    match &err {
        WarehouseError::ScriptExecution { stage, unit, .. } => {
            assert_eq!(*stage, TransformStage::Marts);
            assert_eq!(unit, "02_broken");
        }
        other => panic!("unexpected error: {other}"),
    }

    assert!(warehouse.table_exists("first_unit").await.expect("lookup"));
    assert!(!warehouse.table_exists("partial_unit").await.expect("lookup"));
    assert!(!warehouse.table_exists("third_unit").await.expect("lookup"));
}

#[tokio::test]
async fn empty_marts_export_header_only_files() {
    let dir = temp_dir("empty_marts");
    let raw_dir = generate_raw(&dir, 0);
    let mut warehouse = Warehouse::open(&dir.join("warehouse.sqlite"), true)
        .await
        .expect("open warehouse");
    load_raw_tables(warehouse.connection(), &raw_dir)
        .await
        .expect("load");
    for stage in [TransformStage::Staging, TransformStage::Marts] {
        TransformBatch::discover(stage, &sql_dir().join(stage.as_str()))
            .expect("discover shipped scripts")
            .execute(warehouse.connection())
            .await
            .expect("execute shipped scripts");
    }

    let export_dir = dir.join("exports");
    let exported = export_marts(warehouse.connection(), &export_dir)
        .await
        .expect("export marts");
    assert_eq!(exported.len(), MART_TABLES.len());

    for table in &exported {
        assert_eq!(table.rows, 0);
        let contents = fs::read_to_string(&table.path).expect("read export");
        assert_eq!(contents.lines().count(), 1, "{}", table.path.display());
    }
    let daily = fs::read_to_string(export_dir.join("daily_kpis.csv")).expect("read daily kpis");
    assert_eq!(
        daily.trim_end(),
        "metric_date,new_users,active_users,paid_conversions,gross_revenue_usd,\
         refunded_usd,conversion_rate,refund_rate"
    );
}

#[tokio::test]
async fn exporting_a_missing_table_fails() {
    let dir = temp_dir("missing_mart");
    let mut warehouse = Warehouse::open(&dir.join("warehouse.sqlite"), true)
        .await
        .expect("open warehouse");
    let err = export_marts(warehouse.connection(), &dir.join("exports"))
        .await
        .unwrap_err();
    assert!(matches!(err, WarehouseError::Export(_)));
}
