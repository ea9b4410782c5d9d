use std::env;

use sqldialect::{
    dialect_for, FilterAdapter, FilterDescriptor, FilterValueType, LikeMatchType,
    PaginationState, QueryAdapter, RowLimit, SqlDialectConfig, SqlTemplates, TimeGranularity,
};
use tracing_subscriber::EnvFilter;

fn usage() {
    eprintln!("Usage: print_fragments [db_type] [from_date] [to_date]");
    eprintln!("Example: cargo run --example print_fragments -- prestodb 2024-01-01 2024-01-07");
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = env::args().skip(1).collect::<Vec<_>>();
    if args.iter().any(|a| a == "-h" || a == "--help") {
        usage();
        return Ok(());
    }

    let config = SqlDialectConfig::load_default();
    let dialect = match args.first() {
        Some(db_type) => dialect_for(db_type)?,
        None => config.default_dialect()?,
    };
    let from = args.get(1).map(String::as_str).unwrap_or("2024-01-01");
    let to = args.get(2).map(String::as_str).unwrap_or("2024-01-07");

    let resolved = config.for_dialect(dialect.name());
    let ctx = resolved.query_context().with_pagination(
        PaginationState::new()
            .with_limit(RowLimit::rows(100))
            .with_offset(20),
    );
    let td = resolved.time_dimension("orders.created_at", TimeGranularity::Day, from, to);
    let policy = resolved.refresh_policy(dialect.query_adapter())?;
    let templates = dialect.sql_templates(&SqlTemplates::base())?;

    println!("-- dialect: {}", dialect.name());
    println!("timestamp param:   {}", dialect.timestamp_param());
    println!("convert tz:        {}", dialect.convert_tz(&ctx, "orders.created_at"));
    println!(
        "grouped by day:    {}",
        dialect.time_grouped_column("day", &dialect.convert_tz(&ctx, "orders.created_at"))?
    );
    println!("minus 2 minutes:   {}", dialect.subtract_interval("NOW()", "2 minutes")?);
    println!("unix timestamp:    {}", dialect.unix_timestamp_sql(&ctx));
    println!("pagination:       {}", dialect.group_by_dimension_limit(&ctx)?);
    match dialect.count_distinct_approx("orders.user_id") {
        Ok(sql) => println!("approx distinct:   {sql}"),
        Err(e) => println!("approx distinct:   ({e})"),
    }
    println!(
        "like (contains):   {}",
        dialect.like_ignore_case("users.name", false, "?", LikeMatchType::Contains)
    );
    println!(
        "number param:      {}",
        dialect.cast_parameter(&FilterDescriptor::new("orders.amount", FilterValueType::Number))
    );
    println!(
        "DATETRUNC:         {}",
        templates.function("DATETRUNC").unwrap_or("-")
    );
    println!(
        "refresh policy:    {}",
        serde_json::to_string(&policy)?
    );
    println!("series:\n{}", dialect.series_sql(&td)?);
    Ok(())
}
