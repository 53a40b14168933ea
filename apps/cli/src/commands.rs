//! # Command Handlers
//!
//! One function per subcommand. Handlers write to the given output and read
//! confirmations from the given input, so tests drive them with buffers.
//!
//! ```text
//! Cli ──► execute() ──► handler ──► shoebox-db ──► output::*  ──► out
//!                          │
//!                          └──► CliError (exit code chosen in main)
//! ```

use std::io::{BufRead, Write};
use std::path::Path;

use chrono::NaiveDate;
use tracing::debug;

use shoebox_core::validation::validate_draft;
use shoebox_core::{BarcodeAutofill, CoreError, SellOutcome};
use shoebox_db::{AppConfig, Database, ImportOptions};

use crate::cli::{AddArgs, Command, FilterArgs, ListArgs, UpdateArgs};
use crate::error::{CliError, CliResult};
use crate::output;

/// Everything a handler needs besides its arguments.
pub struct Context {
    pub db: Database,
    pub config: AppConfig,
    /// Explicit `--config` path, used by `init-db --write-config`.
    pub config_path: Option<std::path::PathBuf>,
    /// Default purchase / sale date.
    pub today: NaiveDate,
}

pub async fn execute<W: Write, R: BufRead>(
    command: Command,
    ctx: &Context,
    out: &mut W,
    input: &mut R,
) -> CliResult<()> {
    debug!(?command, "Executing command");

    match command {
        Command::InitDb { write_config } => init_db(ctx, write_config, out).await,
        Command::Add(args) => add(ctx, args, out).await,
        Command::GetBarcode { barcode } => get_barcode(ctx, &barcode, out).await,
        Command::Lookup { barcode } => lookup(ctx, &barcode, out).await,
        Command::List(args) => list(ctx, args, out).await,
        Command::Show { id } => show(ctx, &id, out).await,
        Command::Update(args) => update(ctx, args, out).await,
        Command::Delete { id, force } => delete(ctx, &id, force, out, input).await,
        Command::BulkDelete { ids, force } => bulk_delete(ctx, ids, force, out, input).await,
        Command::Sell { id, barcode, date } => sell(ctx, id, barcode, date, out).await,
        Command::ImportCsv {
            file,
            no_header,
            encoding,
        } => import_csv(ctx, &file, !no_header, encoding, out).await,
        Command::ExportCsv {
            file,
            filters,
            no_headers,
        } => export_csv(ctx, &file, &filters, !no_headers, out).await,
        Command::ExportHtml {
            file,
            title,
            filters,
        } => export_html(ctx, &file, title.as_deref(), &filters, out).await,
        Command::Stats => stats(ctx, out).await,
        Command::ExportStats { file } => export_stats(ctx, &file, out).await,
    }
}

// =============================================================================
// Setup
// =============================================================================

async fn init_db<W: Write>(ctx: &Context, write_config: bool, out: &mut W) -> CliResult<()> {
    writeln!(out, "데이터베이스 연결 확인 중...")?;
    if !ctx.db.health_check().await {
        return Err(CliError::Failed("데이터베이스 연결에 실패했습니다.".into()));
    }
    writeln!(out, "✅ 데이터베이스 연결 성공")?;

    ctx.db.run_migrations().await?;
    let (total, applied) = ctx.db.migration_status().await?;
    writeln!(out, "마이그레이션: {applied}/{total} 적용됨")?;

    if write_config {
        let path = ctx.config.save(ctx.config_path.clone())?;
        writeln!(out, "설정 파일 저장: {}", path.display())?;
    }

    writeln!(out, "✅ 데이터베이스 초기화 완료")?;
    Ok(())
}

// =============================================================================
// Items
// =============================================================================

async fn add<W: Write>(ctx: &Context, args: AddArgs, out: &mut W) -> CliResult<()> {
    let mut draft = args.to_draft();

    if !args.no_autofill {
        if let Some(barcode) = args.barcode.as_deref() {
            if let Some(latest) = ctx.db.items().latest_by_barcode(barcode).await? {
                debug!(barcode, "Filling blank fields from previous item");
                BarcodeAutofill::from(&latest).fill_blanks(&mut draft);
            }
        }
    }

    let new = validate_draft(draft, &ctx.config.inventory, ctx.today)?;
    let item = ctx.db.items().create(new).await?;

    writeln!(out, "✅ 재고 항목이 성공적으로 추가되었습니다.")?;
    write!(out, "{}", output::item_summary(&item))?;
    Ok(())
}

async fn show<W: Write>(ctx: &Context, id: &str, out: &mut W) -> CliResult<()> {
    let item = ctx
        .db
        .items()
        .get_by_id(id)
        .await?
        .ok_or_else(|| CoreError::ItemNotFound(id.to_string()))?;

    write!(out, "{}", output::item_detail(&item))?;
    Ok(())
}

async fn update<W: Write>(ctx: &Context, args: UpdateArgs, out: &mut W) -> CliResult<()> {
    let patch = args.to_patch();
    if patch.is_empty() {
        return Err(CliError::Usage("수정할 항목이 지정되지 않았습니다.".into()));
    }

    let item = ctx
        .db
        .items()
        .update(&args.id, &patch)
        .await?
        .ok_or_else(|| CoreError::ItemNotFound(args.id.clone()))?;

    writeln!(out, "✅ 재고 항목이 성공적으로 수정되었습니다.")?;
    write!(out, "{}", output::item_summary(&item))?;
    Ok(())
}

async fn delete<W: Write, R: BufRead>(
    ctx: &Context,
    id: &str,
    force: bool,
    out: &mut W,
    input: &mut R,
) -> CliResult<()> {
    let item = ctx
        .db
        .items()
        .get_by_id(id)
        .await?
        .ok_or_else(|| CoreError::ItemNotFound(id.to_string()))?;

    if !force {
        writeln!(out, "삭제할 항목: {} (ID: {})", item.name, item.id)?;
        if !confirm(out, input, "정말로 삭제하시겠습니까?")? {
            writeln!(out, "삭제가 취소되었습니다.")?;
            return Ok(());
        }
    }

    if !ctx.db.items().delete(id).await? {
        // Removed by someone else between the lookup and the delete.
        return Err(CoreError::ItemNotFound(id.to_string()).into());
    }

    writeln!(out, "✅ 재고 항목이 성공적으로 삭제되었습니다.")?;
    Ok(())
}

async fn bulk_delete<W: Write, R: BufRead>(
    ctx: &Context,
    ids: Vec<String>,
    force: bool,
    out: &mut W,
    input: &mut R,
) -> CliResult<()> {
    if !force && !confirm(out, input, &format!("{}개 항목을 삭제하시겠습니까?", ids.len()))? {
        writeln!(out, "삭제가 취소되었습니다.")?;
        return Ok(());
    }

    let deleted = ctx.db.items().bulk_delete(&ids).await?;
    writeln!(out, "✅ {deleted}개 항목이 삭제되었습니다.")?;

    let missing = ids.len() as u64 - deleted.min(ids.len() as u64);
    if missing > 0 {
        writeln!(out, "  ({missing}개 ID는 찾을 수 없었습니다.)")?;
    }
    Ok(())
}

async fn sell<W: Write>(
    ctx: &Context,
    id: Option<String>,
    barcode: Option<String>,
    date: Option<NaiveDate>,
    out: &mut W,
) -> CliResult<()> {
    let sale_date = date.unwrap_or(ctx.today);

    let outcome = match (&id, &barcode) {
        (Some(id), _) => ctx.db.items().sell(id, sale_date).await?,
        (None, Some(barcode)) => ctx.db.items().sell_by_barcode(barcode, sale_date).await?,
        (None, None) => return Err(CliError::Usage("ID 또는 --barcode가 필요합니다.".into())),
    };

    match outcome {
        SellOutcome::Sold(item) => {
            writeln!(out, "✅ 판매 처리되었습니다. (판매일: {sale_date})")?;
            write!(out, "{}", output::item_summary(&item))?;
            Ok(())
        }
        SellOutcome::AlreadySold(item) => Err(CoreError::AlreadySold {
            id: item.id,
            sale_date: item.sale_date.unwrap_or(sale_date),
        }
        .into()),
        SellOutcome::NotFound => Err(match (id, barcode) {
            (Some(id), _) => CoreError::ItemNotFound(id),
            (None, barcode) => CoreError::BarcodeNotFound(barcode.unwrap_or_default()),
        }
        .into()),
    }
}

async fn list<W: Write>(ctx: &Context, args: ListArgs, out: &mut W) -> CliResult<()> {
    let query = args.to_query();
    let result = ctx.db.items().search(&query).await?;

    if result.items.is_empty() {
        writeln!(out, "검색 결과가 없습니다.")?;
        return Ok(());
    }

    write!(out, "{}", output::item_table(&result.items))?;
    writeln!(out)?;
    writeln!(
        out,
        "총 {}개 항목 중 {}개 표시",
        result.total_count,
        result.items.len()
    )?;

    if result.has_more {
        writeln!(
            out,
            "더 많은 결과가 있습니다. --offset {} --limit {}로 조회하세요.",
            query.offset + query.limit,
            query.limit
        )?;
    }
    Ok(())
}

// =============================================================================
// Barcodes
// =============================================================================

async fn get_barcode<W: Write>(ctx: &Context, barcode: &str, out: &mut W) -> CliResult<()> {
    let record = ctx
        .db
        .barcodes()
        .get(barcode)
        .await?
        .ok_or_else(|| CoreError::BarcodeNotFound(barcode.to_string()))?;

    writeln!(out, "✅ 바코드 정보 조회 완료")?;
    write!(out, "{}", output::barcode_record(&record))?;
    Ok(())
}

async fn lookup<W: Write>(ctx: &Context, barcode: &str, out: &mut W) -> CliResult<()> {
    let items = ctx.db.items();
    let latest = items
        .latest_by_barcode(barcode)
        .await?
        .ok_or_else(|| CoreError::BarcodeNotFound(barcode.to_string()))?;

    writeln!(out, "자동완성 정보 (최근 등록 항목 기준)")?;
    write!(out, "{}", output::autofill(&BarcodeAutofill::from(&latest)))?;

    let unsold = items.unsold_by_barcode(barcode).await?;
    writeln!(out)?;
    if unsold.is_empty() {
        writeln!(out, "판매 가능한 재고가 없습니다.")?;
    } else {
        writeln!(out, "판매 가능한 재고: {}개", unsold.len())?;
        write!(out, "{}", output::item_table(&unsold))?;
    }
    Ok(())
}

// =============================================================================
// Import / Export
// =============================================================================

async fn import_csv<W: Write>(
    ctx: &Context,
    file: &Path,
    has_header: bool,
    encoding: Option<String>,
    out: &mut W,
) -> CliResult<()> {
    writeln!(out, "CSV 파일 가져오기 시작: {}", file.display())?;

    let options = ImportOptions {
        has_header,
        encoding,
    };
    let result = ctx
        .db
        .importer(ctx.config.inventory.clone())
        .import_file(file, &options)
        .await?;

    write!(out, "{}", output::import_summary(&result))?;

    if result.success_count == 0 {
        return Err(CliError::Failed("가져오기에 실패했습니다.".into()));
    }

    writeln!(out, "✅ 가져오기가 완료되었습니다.")?;
    Ok(())
}

async fn export_csv<W: Write>(
    ctx: &Context,
    file: &Path,
    filters: &FilterArgs,
    include_headers: bool,
    out: &mut W,
) -> CliResult<()> {
    writeln!(out, "CSV 내보내기 시작: {}", file.display())?;

    let count = ctx
        .db
        .exporter()
        .export_csv(file, filters.export_query(), include_headers)
        .await?;

    writeln!(out, "✅ CSV 내보내기 완료: {} ({count}개 항목)", file.display())?;
    Ok(())
}

async fn export_html<W: Write>(
    ctx: &Context,
    file: &Path,
    title: Option<&str>,
    filters: &FilterArgs,
    out: &mut W,
) -> CliResult<()> {
    writeln!(out, "HTML 내보내기 시작: {}", file.display())?;

    let count = ctx
        .db
        .exporter()
        .export_html(file, filters.export_query(), title)
        .await?;

    writeln!(out, "✅ HTML 내보내기 완료: {} ({count}개 항목)", file.display())?;
    Ok(())
}

async fn stats<W: Write>(ctx: &Context, out: &mut W) -> CliResult<()> {
    let items = ctx.db.items();
    let stats = items.statistics().await?;
    let vendors = items.vendors().await?;
    let locations = items.locations().await?;

    write!(out, "{}", output::stats(&stats, &vendors, &locations))?;
    Ok(())
}

async fn export_stats<W: Write>(ctx: &Context, file: &Path, out: &mut W) -> CliResult<()> {
    writeln!(out, "통계 보고서 내보내기 시작: {}", file.display())?;
    ctx.db.exporter().export_stats(file).await?;
    writeln!(out, "✅ 통계 보고서 내보내기 완료: {}", file.display())?;
    Ok(())
}

/// Asks a yes/no question; only `y` / `yes` counts as yes.
fn confirm<W: Write, R: BufRead>(out: &mut W, input: &mut R, question: &str) -> CliResult<bool> {
    write!(out, "{question} [y/N]: ")?;
    out.flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use clap::Parser;
    use shoebox_db::DbConfig;

    async fn context() -> Context {
        Context {
            db: Database::new(DbConfig::in_memory()).await.unwrap(),
            config: AppConfig::default(),
            config_path: None,
            today: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
        }
    }

    /// Runs `shoebox <args>` and returns stdout.
    async fn run(ctx: &Context, args: &[&str]) -> CliResult<String> {
        run_with_input(ctx, args, "").await
    }

    async fn run_with_input(ctx: &Context, args: &[&str], input: &str) -> CliResult<String> {
        let cli = Cli::try_parse_from(std::iter::once("shoebox").chain(args.iter().copied()))
            .expect("arguments parse");
        let mut out = Vec::new();
        let mut input = input.as_bytes();
        execute(cli.command, ctx, &mut out, &mut input).await?;
        Ok(String::from_utf8(out).unwrap())
    }

    async fn add_dunk(ctx: &Context, barcode: &str) -> String {
        run(
            ctx,
            &[
                "add", "-l", "B-02", "-p", "2024-04-01", "-m", "DD1391-100", "-n", "Dunk Low",
                "-v", "KREAM", "--price", "139,000", "-s", "270", "-b", barcode,
            ],
        )
        .await
        .unwrap();
        ctx.db.items().latest_by_barcode(barcode).await.unwrap().unwrap().id
    }

    #[tokio::test]
    async fn test_add_and_show() {
        let ctx = context().await;
        let id = add_dunk(&ctx, "8801").await;

        let text = run(&ctx, &["show", &id]).await.unwrap();
        assert!(text.contains("위치: B-02"));
        assert!(text.contains("가격: ₩139,000"));
        assert!(text.contains("상태: 재고"));
    }

    #[tokio::test]
    async fn test_add_missing_required_is_usage_error() {
        let ctx = context().await;
        let err = run(&ctx, &["add", "-m", "M1", "-n", "N1"]).await.unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert_eq!(ctx.db.items().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_add_autofills_from_barcode() {
        let ctx = context().await;
        add_dunk(&ctx, "8801").await;

        run(&ctx, &["add", "-l", "C-01", "-p", "2024-04-20", "-b", "8801"])
            .await
            .unwrap();

        let unsold = ctx.db.items().unsold_by_barcode("8801").await.unwrap();
        assert_eq!(unsold.len(), 2);
        assert!(unsold.iter().all(|i| i.model_name == "DD1391-100" && i.vendor == "KREAM"));

        let err = run(
            &ctx,
            &["add", "-l", "C-01", "-p", "2024-04-20", "-b", "8801", "--no-autofill"],
        )
        .await
        .unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[tokio::test]
    async fn test_show_unknown_is_not_found() {
        let ctx = context().await;
        let err = run(&ctx, &["show", "nope"]).await.unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }

    #[tokio::test]
    async fn test_sell_twice_is_conflict() {
        let ctx = context().await;
        let id = add_dunk(&ctx, "8801").await;

        let text = run(&ctx, &["sell", &id, "--date", "2024-04-15"]).await.unwrap();
        assert!(text.contains("판매일: 2024-04-15"));

        let err = run(&ctx, &["sell", &id]).await.unwrap_err();
        assert_eq!(err.exit_code(), 4);

        let item = ctx.db.items().get_by_id(&id).await.unwrap().unwrap();
        assert_eq!(item.sale_date, NaiveDate::from_ymd_opt(2024, 4, 15));
    }

    #[tokio::test]
    async fn test_sell_by_barcode() {
        let ctx = context().await;
        add_dunk(&ctx, "8801").await;

        run(&ctx, &["sell", "--barcode", "8801"]).await.unwrap();
        let err = run(&ctx, &["sell", "--barcode", "8801"]).await.unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }

    #[tokio::test]
    async fn test_update_and_empty_patch() {
        let ctx = context().await;
        let id = add_dunk(&ctx, "8801").await;

        let text = run(&ctx, &["update", &id, "-l", "Z-09", "--price", "150000"])
            .await
            .unwrap();
        assert!(text.contains("위치: Z-09"));
        assert!(text.contains("₩150,000"));

        let err = run(&ctx, &["update", &id]).await.unwrap_err();
        assert_eq!(err.exit_code(), 2);

        let err = run(&ctx, &["update", "missing", "-l", "A"]).await.unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }

    #[tokio::test]
    async fn test_delete_confirmation() {
        let ctx = context().await;
        let id = add_dunk(&ctx, "8801").await;

        let text = run_with_input(&ctx, &["delete", &id], "n\n").await.unwrap();
        assert!(text.contains("삭제가 취소되었습니다."));
        assert!(ctx.db.items().get_by_id(&id).await.unwrap().is_some());

        run_with_input(&ctx, &["delete", &id], "y\n").await.unwrap();
        assert!(ctx.db.items().get_by_id(&id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_bulk_delete_force() {
        let ctx = context().await;
        let a = add_dunk(&ctx, "1").await;
        let b = add_dunk(&ctx, "2").await;

        let text = run(&ctx, &["bulk-delete", "-f", &a, &b, "ghost"]).await.unwrap();
        assert!(text.contains("2개 항목이 삭제되었습니다."));
        assert!(text.contains("1개 ID는 찾을 수 없었습니다."));
        assert_eq!(ctx.db.items().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_list_and_paging_hint() {
        let ctx = context().await;
        for barcode in ["1", "2", "3"] {
            add_dunk(&ctx, barcode).await;
        }

        let text = run(&ctx, &["list", "--limit", "2"]).await.unwrap();
        assert!(text.contains("총 3개 항목 중 2개 표시"));
        assert!(text.contains("--offset 2 --limit 2"));

        let text = run(&ctx, &["list", "-k", "no-such-shoe"]).await.unwrap();
        assert!(text.contains("검색 결과가 없습니다."));

        let err = run(&ctx, &["list", "--price-min", "200000", "--price-max", "100000"])
            .await
            .unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[tokio::test]
    async fn test_barcode_commands() {
        let ctx = context().await;
        add_dunk(&ctx, "8801").await;

        let text = run(&ctx, &["get-barcode", "8801"]).await.unwrap();
        assert!(text.contains("모델명: DD1391-100"));

        let text = run(&ctx, &["lookup", "8801"]).await.unwrap();
        assert!(text.contains("판매 가능한 재고: 1개"));

        let err = run(&ctx, &["get-barcode", "0000"]).await.unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }

    #[tokio::test]
    async fn test_import_and_export_files() {
        let ctx = context().await;
        let dir = tempfile::tempdir().unwrap();

        let csv_path = dir.path().join("in.csv");
        std::fs::write(
            &csv_path,
            "위치,구매일,모델명,이름,구매처,가격\n\
             A-01,2024-01-05,M1,N1,KREAM,100000\n\
             A-02,2024-01-06,M2,N2,KREAM,\n\
             A-03,2024-01-07,M3,N3,무신사,\"₩50,000\"\n",
        )
        .unwrap();

        let text = run(&ctx, &["import-csv", csv_path.to_str().unwrap()]).await.unwrap();
        assert!(text.contains("성공: 2개"));
        assert!(text.contains("실패: 1개"));
        assert!(text.contains("행 3:"));

        let out_csv = dir.path().join("out.csv");
        let text = run(&ctx, &["export-csv", out_csv.to_str().unwrap(), "-v", "KREAM"])
            .await
            .unwrap();
        assert!(text.contains("(1개 항목)"));

        let out_html = dir.path().join("report.html");
        run(
            &ctx,
            &["export-html", out_html.to_str().unwrap(), "--title", "4월 보고서"],
        )
        .await
        .unwrap();
        assert!(std::fs::read_to_string(&out_html).unwrap().contains("4월 보고서"));

        let text = run(&ctx, &["stats"]).await.unwrap();
        assert!(text.contains("전체 항목: 2개"));
        assert!(text.contains("• 무신사"));
    }

    #[tokio::test]
    async fn test_import_with_nothing_saved_fails() {
        let ctx = context().await;
        let dir = tempfile::tempdir().unwrap();
        let csv_path = dir.path().join("bad.csv");
        std::fs::write(&csv_path, "위치,구매일,모델명,이름,구매처,가격\nA,nope,M,N,V,1\n").unwrap();

        let err = run(&ctx, &["import-csv", csv_path.to_str().unwrap()])
            .await
            .unwrap_err();
        assert_eq!(err.exit_code(), 1);
    }

    #[tokio::test]
    async fn test_init_db_applies_and_reports_migrations() {
        let ctx = Context {
            db: Database::new(DbConfig::in_memory().run_migrations(false))
                .await
                .unwrap(),
            ..context().await
        };
        let (total, applied) = ctx.db.migration_status().await.unwrap();
        assert_eq!(applied, 0);

        let text = run(&ctx, &["init-db"]).await.unwrap();
        assert!(text.contains(&format!("마이그레이션: {total}/{total} 적용됨")));
        assert!(text.contains("✅ 데이터베이스 초기화 완료"));
        assert_eq!(ctx.db.items().count().await.unwrap(), 0);
    }
}
