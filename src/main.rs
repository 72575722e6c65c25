use ae_tools::backend::{BuiltinBackend, LocationDb};
use ae_tools::chart::{info::info, text::text, Chart};
use ae_tools::config::cli::{Command, ImportArgs, KateriArgs, SemanticArgs};
use ae_tools::config::{Cli, LocalStorage, ToolsConfig};
use ae_tools::core::{ImportEngine, SequenceImportPipeline};
use ae_tools::kateri::Kateri;
use ae_tools::semantic::{clade, continent, new_compared_to, older_than, pale, passage, reference, time_series, vaccine};
use ae_tools::utils::datetime::{get_antigen_date_range, parse_date};
use ae_tools::utils::error::{AeError, ErrorSeverity};
use ae_tools::utils::json::{dumps, DumpOptions};
use ae_tools::utils::org::{dict_to_org_table, org_table_to_dict};
use ae_tools::utils::time_series::time_series as time_series_intervals;
use ae_tools::utils::timeit::{timeit, timeit_async};
use ae_tools::utils::{logger, open_file, validation::Validate};
use ae_tools::whocc::torg::{generate, load_data_fix};
use ae_tools::whocc::{AceDataFixer, DataFix, JsonTableExtractor, NoDataFix, RuleDataFix, TableDir};
use anyhow::Context as _;
use clap::Parser;
use serde_json::{Map, Value};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // 初始化日誌
    if cli.log_json {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }
    if cli.verbose {
        tracing::debug!("CLI: {:?}", cli);
    }

    if let Err(e) = run(cli).await {
        let exit_code = match e.downcast_ref::<AeError>() {
            Some(error) => {
                tracing::error!(
                    "❌ {} (Category: {:?}, Severity: {:?})",
                    error,
                    error.category(),
                    error.severity()
                );
                eprintln!("❌ {}", error.user_friendly_message());
                eprintln!("💡 建議: {}", error.recovery_suggestion());
                // 根據錯誤嚴重程度決定退出碼
                match error.severity() {
                    ErrorSeverity::Low => 0,
                    ErrorSeverity::Medium => 2,
                    ErrorSeverity::High => 1,
                    ErrorSeverity::Critical => 3,
                }
            }
            None => {
                tracing::error!("❌ {:#}", e);
                eprintln!("❌ {:#}", e);
                1
            }
        };
        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = ToolsConfig::load(cli.config.as_deref())?;
    config.validate()?;

    let backend = match cli.locdb.clone().or_else(|| config.locdb_path()) {
        Some(path) => BuiltinBackend::with_locdb(LocationDb::from_file(&path)?),
        None => BuiltinBackend::new(),
    };

    match cli.command {
        Command::ImportSequences(args) => import_sequences(args, &config, backend, cli.monitor).await,
        Command::OrgToJson { input, output } => {
            let rows = org_table_to_dict(&open_file::read_to_string(&input)?);
            let text = dumps(&serde_json::to_value(rows)?, &DumpOptions::indented(1))?;
            write_output(output.as_deref(), &text)
        }
        Command::JsonToOrg {
            input,
            output,
            fields,
            no_wrapper,
        } => {
            let rows: Vec<Map<String, Value>> = serde_json::from_str(&open_file::read_to_string(&input)?)
                .with_context(|| format!("{}: expected a JSON array of objects", input.display()))?;
            let fields: Vec<&str> = fields.iter().map(String::as_str).collect();
            write_output(output.as_deref(), &dict_to_org_table(&rows, &fields, !no_wrapper))
        }
        Command::TimeSeries {
            chart,
            period,
            first,
            last,
        } => {
            let chart = Chart::read(&chart)?;
            let (first, last) = get_antigen_date_range(&chart, first.as_deref(), last.as_deref(), true)?;
            for (begin, end) in time_series_intervals(first, last, period) {
                println!("{} {}", begin, end);
            }
            Ok(())
        }
        Command::FormatJson {
            input,
            output,
            indent,
            width,
        } => {
            let data: Value = serde_json::from_str(&open_file::read_to_string(&input)?)?;
            let options = DumpOptions {
                indent: Some(indent),
                compact: true,
                one_line_max_width: width,
            };
            write_output(output.as_deref(), &dumps(&data, &options)?)
        }
        Command::ChartInfo { chart, all } => {
            println!("{}", info(&Chart::read(&chart)?, all));
            Ok(())
        }
        Command::ChartText { chart } => {
            println!("{}", text(&Chart::read(&chart)?, &backend));
            Ok(())
        }
        Command::FixAce {
            input,
            output,
            passages,
        } => {
            let mut chart = Chart::read(&input)?;
            let mut fixer = AceDataFixer::new(&chart, &backend);
            fixer.antigen_names(&mut chart);
            fixer.serum_names(&mut chart);
            if passages {
                fixer.antigen_passages(&mut chart);
                fixer.serum_passages(&mut chart);
            }
            eprint!("{}", fixer.report());
            chart.write(output.as_deref().unwrap_or(&input))?;
            Ok(())
        }
        Command::Semantic(args) => semantic(&args, &backend),
        Command::Torg {
            table,
            output,
            data_fix,
        } => torg(&table, output.as_deref(), data_fix.as_deref(), &config),
        Command::Kateri(args) => kateri(&args, &config).await,
    }
}

async fn import_sequences(
    mut args: ImportArgs,
    config: &ToolsConfig,
    backend: BuiltinBackend,
    monitor_enabled: bool,
) -> anyhow::Result<()> {
    args.apply_defaults(&config.import);
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    // 創建存儲和管道
    let storage = LocalStorage::new(".".to_string());
    let pipeline = SequenceImportPipeline::new(storage, args, Arc::new(backend));
    let engine = ImportEngine::new_with_monitoring(pipeline, monitor_enabled);
    let output_path = timeit_async("sequence import", engine.run()).await?;
    println!("✅ Sequence import completed, output saved to: {}", output_path);
    Ok(())
}

fn semantic(args: &SemanticArgs, backend: &BuiltinBackend) -> anyhow::Result<()> {
    let mut chart = Chart::read(&args.chart)?;
    if args.passage {
        passage::attributes(&mut chart, backend);
    }
    if args.continent {
        continent::attributes(&mut chart, backend);
    }
    if args.reference {
        reference::attributes(&mut chart);
    }
    if let Some(previous) = &args.new_compared_to {
        let previous = Chart::read(previous)?;
        let marked = new_compared_to::attributes(&mut chart, &previous, 1);
        tracing::info!("🆕 {} new antigens", marked);
    }
    if let Some(conference_date) = &args.older_than {
        let conference_date = parse_date(conference_date)?;
        older_than::attributes(&mut chart, conference_date);
        older_than::style(&mut chart);
    }
    if args.pale {
        pale::style(&mut chart, pale::DEFAULT_STYLE_NAME);
    }
    if let Some(path) = &args.clades {
        let entries: Vec<clade::CladeEntry> = serde_json::from_str(&open_file::read_to_string(path)?)
            .with_context(|| format!("{}: invalid clade entries", path.display()))?;
        clade::clades(&mut chart, &args.clades_style, &entries, &clade::default_modifier(), true);
    }
    if let Some(path) = &args.vaccines {
        let entries: Vec<vaccine::VaccineEntry> = serde_json::from_str(&open_file::read_to_string(path)?)
            .with_context(|| format!("{}: invalid vaccine entries", path.display()))?;
        if let Some((_, report)) =
            vaccine::vaccines_and_plot_style(&mut chart, backend, &entries, &vaccine::default_modifier())
        {
            eprintln!("{}", report.report());
        }
    }
    if let Some(period) = args.time_series {
        let names = time_series::style(&mut chart, time_series::DEFAULT_PREFIX, None, None, period)?;
        tracing::info!("📅 {} time series styles", names.len());
    }
    chart.write(args.output.as_deref().unwrap_or(&args.chart))?;
    Ok(())
}

fn torg(table: &Path, output: Option<&Path>, data_fix: Option<&Path>, config: &ToolsConfig) -> anyhow::Result<()> {
    let extractor = JsonTableExtractor::from_file(table)?;
    let table_dir = config.tables_dir().map(TableDir::new).or_else(|| TableDir::from_env().ok());
    let data_fix: Box<dyn DataFix> = match (data_fix, &table_dir) {
        (Some(path), _) => Box::new(RuleDataFix::from_file(path)?),
        (None, Some(table_dir)) => load_data_fix(table_dir, &extractor)?,
        (None, None) => Box::new(NoDataFix),
    };
    let output = match (output, &table_dir) {
        (Some(path), _) => Some(path.to_path_buf()),
        (None, Some(table_dir)) => Some(table_dir.torg_pathname(&extractor, None)?),
        (None, None) => None,
    };
    let mut writer: Box<dyn Write> = match &output {
        Some(path) => open_file::for_writing(path)?,
        None => Box::new(std::io::stdout()),
    };
    let torg_info = timeit("torg", || generate(&extractor, data_fix.as_ref(), &mut writer))?;
    writer.flush()?;
    if let Some(path) = &output {
        tracing::info!("📝 {} written", path.display());
    }
    if torg_info.multivalue_titer {
        tracing::warn!("⚠️ table has multivalue titers");
    }
    Ok(())
}

async fn kateri(args: &KateriArgs, config: &ToolsConfig) -> anyhow::Result<()> {
    let chart = Chart::read(&args.chart)?;
    let kateri = Kateri::start(
        &config.kateri.executable,
        Path::new(&config.kateri.socket),
        config.kateri.connect_timeout(),
    )
    .await?;
    let communicator = kateri.communicator().clone();
    communicator.send_chart(&chart).await?;
    match &args.pdf {
        Some(filename) => {
            communicator
                .pdf(filename, args.style.as_deref(), args.width, args.open)
                .await?;
            kateri.shutdown().await?;
        }
        None => {
            if let Some(style) = &args.style {
                communicator.set_style(style).await?;
            }
            kateri.wait().await?;
        }
    }
    Ok(())
}

fn write_output(output: Option<&Path>, text: &str) -> anyhow::Result<()> {
    match output {
        Some(path) => open_file::write_string(path, text)?,
        None => println!("{}", text),
    }
    Ok(())
}
