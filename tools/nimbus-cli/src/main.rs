//! NimbusDB Command Line Interface
//!
//! A small driver around the in-memory document store: seeds the demo
//! collection and runs queries against it.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use nimbus::{equal, greater_equal, Collection, Database, Document, IndexDef, Value};

/// NimbusDB Command Line Interface
///
/// An in-memory, schema-flexible document store with secondary indexes.
#[derive(Parser, Debug)]
#[command(name = "nimbus")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, default_value = "text", global = true)]
    pub format: OutputFormat,

    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for query results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed document format
    Text,
    /// JSON, one document per line
    Json,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Seed the demo collection and print every document
    Dump,
    /// Seed the demo collection and dump its indexes
    Indexes,
    /// Query the demo collection for a house
    House {
        /// House name to filter on
        name: String,
    },
    /// Query the demo collection for a minimum gpa
    Gpa {
        /// Lowest gpa to include
        #[arg(default_value_t = 3.0)]
        min: f64,
    },
}

fn student(name: &str, house: &str, gpa: f64, classes: &[&str]) -> Document {
    let mut doc = Document::generated();
    doc.fields_mut().insert("name", name);
    doc.fields_mut().insert("house", house);
    doc.fields_mut().insert("gpa", gpa);
    doc.fields_mut().insert("classes", Value::array(classes.iter().copied()));
    doc
}

/// Build the demo database with its six students and two indexes.
fn seed() -> Result<Database> {
    let mut db = Database::new();
    if !db.create("students") {
        bail!("collection already exists");
    }
    let students = db.get_mut("students").context("collection just created")?;
    students.create_index(IndexDef::new(["house"]));
    students.create_index(IndexDef::new(["name", "gpa"]));

    students.insert(student(
        "Harry Potter",
        "Gryffindor",
        2.9,
        &["Transfiguration", "Herbology"],
    ));
    students.insert(student("Ron Weasley", "Gryffindor", 2.56, &["Potions"]));
    students.insert(student(
        "Hermonie Granger",
        "Gryffindor",
        4.0,
        &["Charms", "Divination", "Potions", "Transfiguration"],
    ));
    students.insert(student("Luna Lovegood", "Ravenclaw", 3.5, &["Divination", "Charms"]));
    students.insert(student("Draco Malfoy", "Slytherine", 3.12, &["Charms", "Transfiguration"]));
    students.insert(student(
        "Cho Chang",
        "Ravenclaw",
        3.56,
        &["Charms", "Divination", "Herbology"],
    ));

    info!(count = 6, "seeded demo collection");
    Ok(db)
}

fn print_documents<'a>(
    docs: impl Iterator<Item = &'a Document>,
    format: OutputFormat,
) -> Result<()> {
    for doc in docs {
        match format {
            OutputFormat::Text => println!("{doc}"),
            OutputFormat::Json => {
                println!("{}", serde_json::to_string(doc).context("serializing document")?);
            }
        }
    }
    Ok(())
}

fn students(db: &Database) -> Result<&Collection> {
    db.get("students").context("demo collection missing")
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let db = seed()?;

    match cli.command {
        Commands::Dump => {
            print_documents(students(&db)?.iter(), cli.format)?;
        }
        Commands::Indexes => {
            print!("{}", students(&db)?.index_manager());
        }
        Commands::House { name } => {
            let coll = students(&db)?;
            print_documents(coll.scan(&[equal("house", name.as_str())]), cli.format)?;
        }
        Commands::Gpa { min } => {
            let coll = students(&db)?;
            print_documents(coll.scan(&[greater_equal("gpa", min)]), cli.format)?;
        }
    }
    Ok(())
}
