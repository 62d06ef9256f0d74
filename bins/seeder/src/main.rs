//! Demo data seeder for HelpTax development.
//!
//! Creates a demo autónomo with a third quarter of 2025 worth of income and
//! expenses. Running it twice is harmless: an existing demo user is left
//! untouched.
//!
//! Usage: cargo run --bin seeder

use anyhow::{Context, anyhow};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::DatabaseConnection;

use helptax_core::auth::{hash_password, validate_registration};
use helptax_core::records::{ExpenseInput, IncomeInput, validate_batch};
use helptax_db::{ExpenseRepository, IncomeRepository, UserRepository};
use helptax_shared::auth::RegisterRequest;
use helptax_shared::types::UserId;

const DEMO_EMAIL: &str = "demo@helptax.dev";
const DEMO_PASSWORD: &str = "demo-autonomo-2025";

/// (day of July 2025, description, client, amount in cents, VAT %, withholding %)
const INCOMES: [(u32, &str, &str, i64, i32, i32); 3] = [
    (4, "Consultoría de datos", "Urodata", 50_000, 0, 0),
    (15, "Desarrollo backend", "Ware26", 175_000, 21, 7),
    (28, "Integración de API", "Ontrackia", 100_000, 21, 0),
];

/// (day of July 2025, description, supplier, amount in cents, VAT %)
const EXPENSES: [(u32, &str, &str, i64, i32); 4] = [
    (1, "Servidores", "Digital Ocean", 3_898, 0),
    (10, "Fibra y móvil", "Movistar", 4_140, 21),
    (12, "Suscripción IA", "Anthropic", 17_990, 0),
    (20, "Comisión plataforma", "Malt", 17_500, 0),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

    println!("Connecting to database...");
    let db = helptax_db::connect(&database_url)
        .await
        .context("Failed to connect to database")?;

    println!("Seeding demo user...");
    let Some(owner) = seed_demo_user(&db).await? else {
        println!("  Demo user already exists, skipping...");
        return Ok(());
    };

    println!("Seeding incomes...");
    seed_incomes(&db, owner).await?;

    println!("Seeding expenses...");
    seed_expenses(&db, owner).await?;

    println!("Seeding complete! Log in as {DEMO_EMAIL} / {DEMO_PASSWORD}");
    Ok(())
}

fn july(day: u32) -> anyhow::Result<NaiveDate> {
    NaiveDate::from_ymd_opt(2025, 7, day).ok_or_else(|| anyhow!("invalid day {day}"))
}

async fn seed_demo_user(db: &DatabaseConnection) -> anyhow::Result<Option<UserId>> {
    let users = UserRepository::new(db.clone());
    if users.email_exists(DEMO_EMAIL).await? {
        return Ok(None);
    }

    let request = RegisterRequest {
        email: Some(DEMO_EMAIL.to_string()),
        password1: Some(DEMO_PASSWORD.to_string()),
        password2: Some(DEMO_PASSWORD.to_string()),
        nombre_fiscal: Some("Demo Autónomo".to_string()),
        nif: Some("00000000T".to_string()),
        direccion: Some("Calle Falsa 123".to_string()),
        codigo_postal: Some("28001".to_string()),
        ciudad: Some("Madrid".to_string()),
        provincia: Some("Madrid".to_string()),
        tipo_irpf_default: Some(7),
    };

    let account = validate_registration(&request).context("invalid demo registration")?;
    let password_hash = hash_password(&account.password)?;
    let (user, _) = users
        .create_with_profile(&account.email, &password_hash, &account.profile)
        .await?;

    println!("  Created demo user: {DEMO_EMAIL}");
    Ok(Some(UserId::from_uuid(user.id)))
}

async fn seed_incomes(db: &DatabaseConnection, owner: UserId) -> anyhow::Result<()> {
    let inputs = INCOMES
        .iter()
        .map(|&(day, descripcion, cliente, cents, iva, irpf)| {
            Ok(IncomeInput {
                fecha: Some(july(day)?),
                descripcion: Some(descripcion.to_string()),
                cliente: Some(cliente.to_string()),
                importe: Some(Decimal::new(cents, 2)),
                iva_porcentaje: Some(iva),
                irpf_porcentaje: Some(irpf),
                ..IncomeInput::default()
            })
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    let drafts = validate_batch("ingresos", &inputs)
        .map_err(|errors| anyhow!("invalid demo income: {errors:?}"))?;
    let created = IncomeRepository::new(db.clone())
        .bulk_create(owner, &drafts)
        .await?;

    println!("  Created {} incomes", created.len());
    Ok(())
}

async fn seed_expenses(db: &DatabaseConnection, owner: UserId) -> anyhow::Result<()> {
    let inputs = EXPENSES
        .iter()
        .map(|&(day, descripcion, proveedor, cents, iva)| {
            Ok(ExpenseInput {
                fecha: Some(july(day)?),
                descripcion: Some(descripcion.to_string()),
                proveedor: Some(proveedor.to_string()),
                importe: Some(Decimal::new(cents, 2)),
                iva_porcentaje: Some(iva),
                ..ExpenseInput::default()
            })
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    let drafts = validate_batch("gastos", &inputs)
        .map_err(|errors| anyhow!("invalid demo expense: {errors:?}"))?;
    let created = ExpenseRepository::new(db.clone())
        .bulk_create(owner, &drafts)
        .await?;

    println!("  Created {} expenses", created.len());
    Ok(())
}
