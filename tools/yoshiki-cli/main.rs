use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::collections::HashSet;
use std::fs;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use yoshiki::ast::DisplayExpression;
use yoshiki::prelude::*;

/// Inspect, check and fill in saved forms from the command line
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Directory holding the saved-forms store
    #[arg(short, long, default_value = ".")]
    store: String,

    /// Optional engine config JSON file
    #[arg(short, long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List saved forms, newest first
    List,
    /// Print a saved form as JSON
    Show { id: String },
    /// Check a form JSON file: field order, options and the derived-field graph
    Check {
        path: String,
        /// Print the compiled tree of every custom formula
        #[arg(long)]
        ast: bool,
    },
    /// Add a form JSON file to the store
    Import { path: String },
    /// Remove a saved form
    Delete { id: String },
    /// Fill in a saved form with values from a JSON file and validate it
    Preview {
        id: String,
        /// Path to a JSON file mapping field ids to values
        #[arg(short, long)]
        values: Option<String>,
        /// Date to compute ages against (YYYY-MM-DD)
        #[arg(long)]
        today: Option<NaiveDate>,
        /// Explain how each custom formula reached its value
        #[arg(long)]
        explain: bool,
    },
}

fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => EngineConfig::from_file(path)
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to load config: {}", e))),
        None => EngineConfig::default(),
    };
    let mut library = FormLibrary::open(JsonFileStore::new(&cli.store, &config))
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to open form store: {}", e)));

    match cli.command {
        Command::List => run_list(&library),
        Command::Show { id } => {
            let form = find_form(&library, &id);
            let json = serde_json::to_string_pretty(form)
                .unwrap_or_else(|e| exit_with_error(&format!("Failed to encode form: {}", e)));
            println!("{}", json);
        }
        Command::Check { path, ast } => run_check(&read_form(&path), &config, ast),
        Command::Import { path } => {
            let form = read_form(&path);
            if library.get(&form.id).is_some() {
                exit_with_error(&format!("A form with id '{}' is already stored", form.id));
            }
            let (id, name) = (form.id.clone(), form.name.clone());
            library
                .insert(form)
                .unwrap_or_else(|e| exit_with_error(&format!("Failed to store form: {}", e)));
            println!("Imported '{}' ({})", name, id);
        }
        Command::Delete { id } => {
            let removed = library
                .delete(&id)
                .unwrap_or_else(|e| exit_with_error(&format!("Failed to delete form: {}", e)));
            println!("Deleted '{}' ({})", removed.name, removed.id);
        }
        Command::Preview {
            id,
            values,
            today,
            explain,
        } => run_preview(find_form(&library, &id), &config, values, today, explain),
    }
}

fn run_list(library: &FormLibrary<JsonFileStore>) {
    if library.is_empty() {
        println!("No saved forms in {}", library.repository().path().display());
        return;
    }
    for form in library.list() {
        println!(
            "{}  {:<30}  {} field(s), {} derived  created {}",
            form.id,
            form.name,
            form.fields.len(),
            form.derived_count(),
            form.created_at.format("%Y-%m-%d %H:%M")
        );
    }
}

fn run_check(form: &FormSchema, config: &EngineConfig, show_ast: bool) {
    let mut problems = Vec::new();

    let orders: HashSet<usize> = form.fields.iter().map(|f| f.order).collect();
    if orders.len() != form.fields.len() || (0..form.fields.len()).any(|i| !orders.contains(&i)) {
        problems.push("field order values are not a dense 0-based sequence".to_string());
    }
    for field in &form.fields {
        if field.kind.has_options() && field.options.as_ref().is_none_or(|o| o.is_empty()) {
            problems.push(format!("'{}' is a {:?} field without options", field.label, field.kind));
        }
        if field.is_derived != field.derived_field.is_some() {
            problems.push(format!("'{}' has an inconsistent derived flag", field.label));
        }
    }

    match DerivationPlan::build(&form.fields, config) {
        Ok(plan) => {
            println!("Derived fields in evaluation order:");
            for step in plan.steps() {
                let label = form.field(&step.field_id).map_or("?", |f| f.label.as_str());
                println!("  - {} ({})", label, String::from(step.spec.kind.clone()));
                if let (true, Some(Ok(formula))) = (show_ast, &step.formula) {
                    print!("{}", DisplayExpression { expr: formula.ast() });
                }
            }
            for (field_id, error) in plan.formula_errors() {
                problems.push(format!("formula of '{}' does not compile: {}", field_id, error));
            }
        }
        Err(e) => problems.push(e.to_string()),
    }

    if problems.is_empty() {
        println!("\n'{}' is valid.", form.name);
    } else {
        for problem in &problems {
            eprintln!("  ! {}", problem);
        }
        exit_with_error(&format!("'{}' has {} problem(s)", form.name, problems.len()));
    }
}

fn run_preview(
    form: &FormSchema,
    config: &EngineConfig,
    values_path: Option<String>,
    today: Option<NaiveDate>,
    explain: bool,
) {
    let mut session = PreviewSession::new(&form.fields, config)
        .unwrap_or_else(|e| exit_with_error(&format!("Cannot preview '{}': {}", form.name, e)));
    if let Some(today) = today {
        session = session.with_today(today);
    }

    if let Some(path) = values_path {
        let content = fs::read_to_string(&path)
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to read '{}': {}", path, e)));
        let values: ValuesMap = serde_json::from_str(&content)
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to parse values: {}", e)));
        // Derived fields are computed, never entered.
        for field in form.fields_in_order().into_iter().filter(|f| !f.is_derived) {
            if let Some(value) = values.get(&field.id) {
                session
                    .set_value(&field.id, value.clone())
                    .unwrap_or_else(|e| exit_with_error(&e.to_string()));
            }
        }
    }

    println!("Preview of '{}':", form.name);
    for field in session.fields() {
        let value = session.value(&field.id).map(|v| v.to_string()).unwrap_or_default();
        let marker = if field.is_derived { " (derived)" } else { "" };
        println!("  {:<24} = {:?}{}", field.label, value, marker);
        if explain {
            if let Some(reason) = session.explain(&field.id) {
                println!("      because {}", reason);
            }
        }
    }

    match session.submit() {
        Ok(_) => println!("\nAll fields are valid."),
        Err(errors) => {
            for (field_id, message) in errors.iter() {
                let label = form.field(field_id).map_or(field_id, |f| f.label.as_str());
                eprintln!("  ! {}: {}", label, message);
            }
            exit_with_error(&format!("{} field(s) failed validation", errors.len()));
        }
    }
}

fn find_form<'a>(library: &'a FormLibrary<JsonFileStore>, id: &str) -> &'a FormSchema {
    library
        .get(id)
        .unwrap_or_else(|| exit_with_error(&format!("No saved form with id '{}'", id)))
}

fn read_form(path: &str) -> FormSchema {
    let content = fs::read_to_string(path)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to read '{}': {}", path, e)));
    serde_json::from_str(&content)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to parse form JSON: {}", e)))
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_reads_values_from_a_file_path() {
        let cli = Cli::try_parse_from([
            "yoshiki-cli",
            "preview",
            "form-1",
            "--values",
            "values.json",
            "--today",
            "2024-06-15",
        ])
        .unwrap();
        match cli.command {
            Command::Preview { id, values, today, explain } => {
                assert_eq!(id, "form-1");
                assert_eq!(values.as_deref(), Some("values.json"));
                assert_eq!(today, NaiveDate::from_ymd_opt(2024, 6, 15));
                assert!(!explain);
            }
            other => panic!("expected preview, got {:?}", other),
        }
    }
}
