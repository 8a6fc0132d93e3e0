use clap::Subcommand;
use serde_json::json;

use crate::cli::context::CliContext;
use crate::cli::utils::{output_empty_collection, output_records, output_success, read_json_input};
use crate::cli::OutputFormat;
use crate::types::{CreateCustomer, Customer, UpdateCustomer};

#[derive(Subcommand)]
pub enum CustomersCommands {
    #[command(about = "List customers")]
    List,

    #[command(about = "Create a customer from --data or stdin")]
    Create {
        #[arg(long, help = "Customer JSON")]
        data: Option<String>,
    },

    #[command(about = "Update a customer from --data or stdin")]
    Update {
        #[arg(help = "Customer phone number")]
        phone: String,
        #[arg(long, help = "Partial customer JSON")]
        data: Option<String>,
    },
}

pub async fn handle(cmd: CustomersCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let ctx = CliContext::load()?;
    let result = run(&ctx, cmd, &output_format).await;
    ctx.persist()?;
    result
}

async fn run(ctx: &CliContext, cmd: CustomersCommands, output_format: &OutputFormat) -> anyhow::Result<()> {
    let customers = ctx.banking.customers();

    match cmd {
        CustomersCommands::List => {
            let list = customers.list().await?;
            if list.is_empty() {
                return output_empty_collection(output_format, "customers", "No customers found");
            }
            output_records(output_format, &list, render_customer)
        }
        CustomersCommands::Create { data } => {
            let customer: CreateCustomer = serde_json::from_value(read_json_input(data)?)?;
            let created = customers.create(&customer).await?;
            output_success(output_format, "Customer created", Some(json!({ "customer": created })))
        }
        CustomersCommands::Update { phone, data } => {
            let updates: UpdateCustomer = serde_json::from_value(read_json_input(data)?)?;
            let updated = customers.update(&phone, &updates).await?;
            output_success(
                output_format,
                &format!("Customer {} updated", phone),
                Some(json!({ "customer": updated })),
            )
        }
    }
}

fn render_customer(c: &Customer) -> String {
    format!("{}  {}  {}  {}", c.full_name, c.email, c.phone, c.customer_segment)
}
