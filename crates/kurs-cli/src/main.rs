use clap::{Parser, Subcommand};
use dialoguer::{Input, Password};
use dotenvy::dotenv;

use kurs_cli::admin::{NewAdmin, create_admin};
use kurs_cli::seeder::{self, SeedConfig};

#[derive(Parser)]
#[command(name = "kurs-cli")]
#[command(about = "Kurs CLI - Administrative tools for the Kurs API", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an admin account
    CreateAdmin {
        /// Display name
        #[arg(short = 'n', long)]
        user_name: Option<String>,

        /// Email address
        #[arg(short = 'e', long)]
        email: Option<String>,

        /// Phone number, digits only
        #[arg(short = 't', long)]
        tel: Option<i64>,

        /// Password (will be prompted securely if not provided)
        #[arg(short = 'p', long)]
        password: Option<String>,
    },
    /// Seed the database with fake categories, courses and students
    Seed {
        /// Number of categories to create
        #[arg(short = 'c', long, default_value = "5")]
        categories: usize,

        /// Number of courses per category
        #[arg(long, default_value = "4")]
        courses: usize,

        /// Number of students
        #[arg(short = 's', long, default_value = "50")]
        students: usize,
    },
    /// Clear courses, categories and seeded students (keeps real accounts)
    ClearSeed,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();

    let cli = Cli::parse();
    let pool = kurs_db::init_db_pool().await?;
    kurs_db::run_migrations(&pool).await?;

    match cli.command {
        Commands::CreateAdmin {
            user_name,
            email,
            tel,
            password,
        } => handle_create_admin(&pool, user_name, email, tel, password).await,
        Commands::Seed {
            categories,
            courses,
            students,
        } => {
            let config = SeedConfig::new(categories)
                .with_courses(courses)
                .with_students(students);
            seeder::seed_all(&pool, config).await
        }
        Commands::ClearSeed => seeder::clear_all(&pool).await,
    }
}

async fn handle_create_admin(
    pool: &sqlx::PgPool,
    user_name: Option<String>,
    email: Option<String>,
    tel: Option<i64>,
    password: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let user_name = match user_name {
        Some(name) => name,
        None => Input::new().with_prompt("Name").interact_text()?,
    };

    let email = match email {
        Some(email) => email,
        None => Input::new().with_prompt("Email address").interact_text()?,
    };

    let tel = match tel {
        Some(tel) => tel,
        None => Input::new().with_prompt("Phone number").interact_text()?,
    };

    let password = match password {
        Some(password) => password,
        None => Password::new()
            .with_prompt("Password")
            .with_confirmation("Confirm password", "Passwords don't match")
            .interact()?,
    };

    let admin = NewAdmin {
        user_name,
        email,
        password,
        tel,
    };

    match create_admin(pool, &admin).await {
        Ok(id) => {
            println!("\n✅ Admin created successfully!");
            println!("   ID: {}", id);
            println!("   Email: {}", admin.email);
            println!("   Name: {}", admin.user_name);
            Ok(())
        }
        Err(e) => {
            eprintln!("\n❌ Error creating admin: {}", e);
            std::process::exit(1);
        }
    }
}
