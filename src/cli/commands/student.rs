use std::fs;
use std::path::PathBuf;

use chrono::Utc;
use clap::{Args, Subcommand};
use serde_json::json;

use crate::cli::config::*;
use crate::cli::utils::*;
use crate::cli::OutputFormat;
use crate::client::{
    default_filename, render_table, require_session, sort_students, to_csv, ApiClient, FormInput, SortKey,
    SortOrder, Stats, StudentFilter, StudentForm,
};
use crate::schema::{ClassLevel, House, Student};

#[derive(Subcommand)]
pub enum StudentCommands {
    #[command(about = "Submit a new registration (no login required)")]
    Submit {
        #[command(flatten)]
        fields: FieldArgs,
    },

    #[command(about = "List records with optional filters and sorting")]
    List {
        #[command(flatten)]
        filter: FilterArgs,
        #[arg(long, value_enum, default_value = "created-at", help = "Sort column")]
        sort: SortKey,
        #[arg(long, help = "Sort descending")]
        desc: bool,
    },

    #[command(about = "Show one record")]
    Get {
        #[arg(help = "Student ID")]
        id: i32,
    },

    #[command(about = "Change fields of an existing record")]
    Edit {
        #[arg(help = "Student ID")]
        id: i32,
        #[command(flatten)]
        fields: FieldArgs,
    },

    #[command(about = "Delete a record")]
    Delete {
        #[arg(help = "Student ID")]
        id: i32,
        #[arg(long, short = 'y', help = "Skip the confirmation prompt")]
        yes: bool,
    },

    #[command(about = "Export the (filtered) records to CSV")]
    Export {
        #[command(flatten)]
        filter: FilterArgs,
        #[arg(long, short = 'o', help = "Output file, '-' for stdout (default student_data_<date>.csv)")]
        output: Option<PathBuf>,
    },

    #[command(about = "Show dashboard statistics")]
    Stats,
}

#[derive(Args, Debug, Clone, Default)]
pub struct FieldArgs {
    #[arg(long, help = "Full name")]
    pub name: Option<String>,
    #[arg(long, help = "Class 1-12")]
    pub class: Option<String>,
    #[arg(long, help = "Section A or B")]
    pub section: Option<String>,
    #[arg(long, help = "House: Shivaji, Tagore, Ashoka or Raman")]
    pub house: Option<String>,
    #[arg(long, help = "Phone number (at least 10 characters, empty to clear)")]
    pub phone: Option<String>,
    #[arg(long, help = "Free-text notes (empty to clear)")]
    pub notes: Option<String>,
}

impl From<FieldArgs> for FormInput {
    fn from(args: FieldArgs) -> Self {
        FormInput {
            name: args.name,
            class: args.class,
            section: args.section,
            house: args.house,
            phone: args.phone,
            notes: args.notes,
        }
    }
}

#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    #[arg(long, help = "Only this class")]
    pub class: Option<ClassLevel>,
    #[arg(long, help = "Only this house")]
    pub house: Option<House>,
    #[arg(long, help = "Case-insensitive name search")]
    pub search: Option<String>,
}

impl From<FilterArgs> for StudentFilter {
    fn from(args: FilterArgs) -> Self {
        StudentFilter {
            class: args.class,
            house: args.house,
            search: args.search,
        }
    }
}

/// Client carrying the stored admin token, or an error when not logged in
fn dashboard_client() -> anyhow::Result<ApiClient> {
    let session = load_session()?;
    let token = require_session(session.as_ref(), Utc::now())?;
    api_client(Some(token.to_string()))
}

fn output_student(output_format: &OutputFormat, student: &Student) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => output_json(student),
        OutputFormat::Text => {
            println!("ID:         {}", student.id);
            println!("Name:       {}", student.name);
            println!("Class:      {}", student.class);
            println!("Section:    {}", student.section);
            println!("House:      {}", student.house);
            println!("Phone:      {}", student.phone.as_deref().unwrap_or("-"));
            println!("Notes:      {}", student.notes.as_deref().unwrap_or("-"));
            println!("Date Added: {}", crate::client::format_date(&student.created_at));
            Ok(())
        }
    }
}

pub async fn handle(cmd: StudentCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        StudentCommands::Submit { fields } => {
            let mut client = api_client(None)?;
            let student = StudentForm::create().submit(&mut client, &fields.into()).await?;

            match output_format {
                OutputFormat::Json => output_json(&student),
                OutputFormat::Text => {
                    println!("✓ Student data submitted successfully (id {})", student.id);
                    Ok(())
                }
            }
        }
        StudentCommands::List { filter, sort, desc } => {
            let mut client = dashboard_client()?;
            let students = client.list_students().await?;
            let filter = StudentFilter::from(filter);

            let mut view = filter.apply(&students);
            let order = if desc { SortOrder::Desc } else { SortOrder::Asc };
            sort_students(&mut view, sort, order);

            if view.is_empty() {
                return output_empty_collection(&output_format, "students", "No students found");
            }

            match output_format {
                OutputFormat::Json => output_json(&json!({ "students": view })),
                OutputFormat::Text => {
                    println!("{}", render_table(&view));
                    println!();
                    println!("Showing {} of {} students", view.len(), students.len());
                    Ok(())
                }
            }
        }
        StudentCommands::Get { id } => {
            let client = dashboard_client()?;
            let student = client.get_student(id).await?;
            output_student(&output_format, &student)
        }
        StudentCommands::Edit { id, fields } => {
            let mut client = dashboard_client()?;
            let existing = client.get_student(id).await?;
            let student = StudentForm::edit(existing).submit(&mut client, &fields.into()).await?;

            match output_format {
                OutputFormat::Json => output_json(&student),
                OutputFormat::Text => {
                    println!("✓ Student record has been updated successfully");
                    output_student(&output_format, &student)
                }
            }
        }
        StudentCommands::Delete { id, yes } => {
            let mut client = dashboard_client()?;
            if !yes {
                let student = client.get_student(id).await?;
                let question = format!("Delete the record for {} (class {}{})?", student.name, student.class, student.section);
                if !confirm(&question)? {
                    println!("Cancelled");
                    return Ok(());
                }
            }

            client.delete_student(id).await?;
            output_success(
                &output_format,
                "Student record has been deleted successfully",
                Some(json!({ "id": id })),
            )
        }
        StudentCommands::Export { filter, output } => {
            let mut client = dashboard_client()?;
            let students = client.list_students().await?;
            let view = StudentFilter::from(filter).apply(&students);
            let csv = to_csv(&view)?;

            let path = output.unwrap_or_else(|| PathBuf::from(default_filename(Utc::now().date_naive())));
            if path.as_os_str() == "-" {
                println!("{}", csv);
                return Ok(());
            }

            fs::write(&path, csv)?;
            output_success(
                &output_format,
                &format!("Exported {} students to {}", view.len(), path.display()),
                Some(json!({ "path": path.display().to_string(), "count": view.len() })),
            )
        }
        StudentCommands::Stats => {
            let mut client = dashboard_client()?;
            let students = client.list_students().await?;
            let stats = Stats::from_students(&students);

            match output_format {
                OutputFormat::Json => output_json(&stats),
                OutputFormat::Text => {
                    println!("{}", stats.render());
                    Ok(())
                }
            }
        }
    }
}
