use clap::Subcommand;
use serde_json::json;

use crate::cli::context::CliContext;
use crate::cli::utils::{output_empty_collection, output_records, output_success, read_json_input};
use crate::cli::OutputFormat;
use crate::types::{Car, CarPage, CreateCar, UpdateCar};

#[derive(Subcommand)]
pub enum CarsCommands {
    #[command(about = "List cars")]
    List {
        #[arg(long, default_value_t = 0, help = "Page offset")]
        page: u32,
        #[arg(long, default_value_t = 10, help = "Page size")]
        limit: u32,
    },

    #[command(about = "Show one car")]
    Get {
        #[arg(help = "Car ID")]
        id: String,
    },

    #[command(about = "Create a car from --data or stdin")]
    Create {
        #[arg(long, help = "Car JSON")]
        data: Option<String>,
    },

    #[command(about = "Update a car from --data or stdin")]
    Update {
        #[arg(help = "Car ID")]
        id: String,
        #[arg(long, help = "Car JSON")]
        data: Option<String>,
    },

    #[command(about = "Delete a car")]
    Delete {
        #[arg(help = "Car ID")]
        id: String,
    },
}

pub async fn handle(cmd: CarsCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let ctx = CliContext::load()?;
    let result = run(&ctx, cmd, &output_format).await;
    ctx.persist()?;
    result
}

async fn run(ctx: &CliContext, cmd: CarsCommands, output_format: &OutputFormat) -> anyhow::Result<()> {
    let cars = ctx.cars.cars();

    match cmd {
        CarsCommands::List { page, limit } => {
            let list = cars.list(CarPage { page, limit }).await?;
            if list.is_empty() {
                return output_empty_collection(output_format, "cars", "No cars found");
            }
            output_records(output_format, &list, render_car)
        }
        CarsCommands::Get { id } => {
            let car = cars.get(&id).await?;
            output_records(output_format, &[car], render_car)
        }
        CarsCommands::Create { data } => {
            let car: CreateCar = serde_json::from_value(read_json_input(data)?)?;
            let created = cars.create(&car).await?;
            output_success(output_format, "Car created", Some(json!({ "car": created })))
        }
        CarsCommands::Update { id, data } => {
            let car: UpdateCar = serde_json::from_value(read_json_input(data)?)?;
            let updated = cars.update(&id, &car).await?;
            output_success(output_format, &format!("Car {} updated", id), Some(json!({ "car": updated })))
        }
        CarsCommands::Delete { id } => {
            let response = cars.delete(&id).await?;
            let message = if response.message.is_empty() {
                format!("Car {} deleted", id)
            } else {
                response.message
            };
            output_success(output_format, &message, None)
        }
    }
}

fn render_car(car: &Car) -> String {
    let id = car.extra.get("id").and_then(|v| v.as_str()).unwrap_or("-");
    format!("{}  {} {} ({})  {:.2}", id, car.make, car.model, car.year, car.price)
}
