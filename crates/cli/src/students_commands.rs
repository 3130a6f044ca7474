use {anyhow::Result, clap::Subcommand};

use {
    tutorbot_config::TutorbotConfig,
    tutorbot_students::{FsStudentDirectory, StudentDirectory},
};

#[derive(Subcommand)]
pub enum StudentsAction {
    /// Print the first row matching a student name.
    Lookup { name: String },
    /// List every known student name.
    Names,
}

pub async fn handle_students(action: StudentsAction, config: &TutorbotConfig) -> Result<()> {
    let directory = FsStudentDirectory::new(&config.data.dir, &config.data.name_column);
    match action {
        StudentsAction::Lookup { name } => match directory.query_student(&name).await? {
            Some(record) => println!("{}", record.to_lines()),
            None => {
                eprintln!("查無此學生: {name}");
                std::process::exit(1);
            },
        },
        StudentsAction::Names => {
            for name in directory.all_names().await? {
                println!("{name}");
            }
        },
    }
    Ok(())
}
