//! staq CLI - compile query strings against an entity model.
//!
//! Usage:
//!   staq compile <entity-type> <query> [--model <file.toml>] [--dialect <dialect>]
//!   staq inspect [--model <file.toml>]
//!
//! Examples:
//!   staq compile Observations '$filter=result gt 10&$top=5'
//!   staq compile Things '$expand=Datastreams($top=3)' --dialect mysql
//!   staq inspect --model model.toml

use clap::{Parser, Subcommand, ValueEnum};
use staq::compiler::QueryCompiler;
use staq::config::Settings;
use staq::model::loader::ModelDef;
use staq::model::{sta, Model};
use staq::sql::{Dialect, FieldCompiler};
use staq::visibility;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "staq")]
#[command(about = "staq - compile SensorThings query options to SQL")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a query string and print the resulting SQL fragments
    Compile {
        /// Root entity type the query targets
        entity_type: String,

        /// The query-option string, e.g. '$filter=result gt 10'
        query: String,

        /// Model definition file (defaults to the built-in SensorThings model)
        #[arg(short, long)]
        model: Option<PathBuf>,

        /// Settings file (staq.toml)
        #[arg(short, long)]
        settings: Option<PathBuf>,

        /// SQL dialect to generate
        #[arg(short, long, default_value = "postgres")]
        dialect: DialectArg,
    },

    /// List the entity types of a model
    Inspect {
        /// Model definition file (defaults to the built-in SensorThings model)
        #[arg(short, long)]
        model: Option<PathBuf>,
    },
}

#[derive(Clone, ValueEnum)]
enum DialectArg {
    Postgres,
    Mysql,
}

impl From<DialectArg> for Dialect {
    fn from(arg: DialectArg) -> Self {
        match arg {
            DialectArg::Postgres => Dialect::Postgres,
            DialectArg::Mysql => Dialect::MySql,
        }
    }
}

fn load_model(path: Option<&PathBuf>) -> Result<Model, String> {
    match path {
        None => Ok(sta::core_model()),
        Some(path) => {
            let text = fs::read_to_string(path)
                .map_err(|e| format!("cannot read {}: {}", path.display(), e))?;
            let def = ModelDef::from_toml(&text).map_err(|e| e.to_string())?;
            def.build().map_err(|e| e.to_string())
        }
    }
}

fn run_compile(
    entity_type: &str,
    query_str: &str,
    model_path: Option<&PathBuf>,
    settings_path: Option<&PathBuf>,
    dialect: Dialect,
) -> Result<(), String> {
    let model = load_model(model_path)?;
    let settings = match settings_path {
        Some(path) => Settings::load(path).map_err(|e| e.to_string())?,
        None => Settings::default(),
    };

    let root = model.entity_type(entity_type).map_err(|e| e.to_string())?;
    let query = QueryCompiler::new(&model, &settings.query)
        .compile_str(root, query_str)
        .map_err(|e| e.to_string())?;

    println!("entity type : {}", root.name);
    if let Some(top) = query.top {
        println!("top         : {}", top);
    }
    if let Some(skip) = query.skip {
        println!("skip        : {}", skip);
    }
    if let Some(count) = query.count {
        println!("count       : {}", count);
    }
    if let Some(format) = &query.format {
        println!("format      : {}", format);
    }

    let fields = FieldCompiler::new(&model, dialect);
    if let Some(filter) = &query.filter {
        let condition = fields.compile_condition(filter).map_err(|e| e.to_string())?;
        println!("filter      : {}", condition.to_sql(dialect));
    }
    for (expr, dir) in fields
        .compile_order_by(&query.order_by)
        .map_err(|e| e.to_string())?
    {
        println!("order by    : {} {:?}", expr.to_sql(dialect), dir);
    }
    for expand in &query.expand {
        let path: Vec<&str> = expand.path.iter().map(|n| n.name.as_str()).collect();
        println!(
            "expand      : {}{}",
            path.join("/"),
            if expand.query.is_some() {
                " (with sub-query)"
            } else {
                ""
            }
        );
    }

    let vis = visibility::resolve(&model, root, Some(&query), true).map_err(|e| e.to_string())?;
    println!(
        "serialized  : {}",
        vis.properties.iter().cloned().collect::<Vec<_>>().join(", ")
    );
    Ok(())
}

fn run_inspect(model_path: Option<&PathBuf>) -> Result<(), String> {
    let model = load_model(model_path)?;
    for entity_type in model.entity_types() {
        println!("{} (table {})", entity_type.name, entity_type.table);
        for property in entity_type.properties() {
            println!("  {}", property.name());
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Compile {
            entity_type,
            query,
            model,
            settings,
            dialect,
        } => run_compile(
            &entity_type,
            &query,
            model.as_ref(),
            settings.as_ref(),
            dialect.into(),
        ),
        Commands::Inspect { model } => run_inspect(model.as_ref()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error: {}", message);
            ExitCode::FAILURE
        }
    }
}
