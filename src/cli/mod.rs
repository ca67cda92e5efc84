use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::application::auth::{Session, StaticCredentials};
use crate::application::dashboard::{self, DashboardSummary};
use crate::application::{AppError, DeleteOutcome, OrderFilter, OrderService, SaveOutcome};
use crate::domain::{OrderStatus, ServiceOrder, dates, format_pesos, parse_pesos};
use crate::storage::{Backend, SqliteStore, StoreConfig};

/// Saldo - Service-Order Billing Ledger
#[derive(Parser)]
#[command(name = "saldo")]
#[command(about = "A local-first billing ledger for field-service orders")]
#[command(version)]
pub struct Cli {
    /// Database file path (falls back to the SALDO_DB environment variable;
    /// with neither set, an in-memory sample store is used)
    #[arg(short, long)]
    pub database: Option<String>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new database
    Init,

    /// Log in (required before any order command)
    Login {
        /// User name
        #[arg(short, long)]
        username: String,

        /// Password
        #[arg(short, long)]
        password: String,
    },

    /// End the current session
    Logout,

    /// Order management commands
    #[command(subcommand)]
    Order(OrderCommands),

    /// List orders, optionally filtered
    List {
        #[command(flatten)]
        filters: FilterArgs,
    },

    /// Control-panel summary of the order book
    Dashboard {
        /// Start of service-date range (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,

        /// End of service-date range (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,

        /// Output format: table, json
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Export the (filtered) order list as CSV
    Export {
        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,

        #[command(flatten)]
        filters: FilterArgs,
    },
}

#[derive(Subcommand)]
pub enum OrderCommands {
    /// Create a new order from a zeroed draft
    Create {
        #[command(flatten)]
        fields: FieldArgs,

        /// Recompute the derived balances before saving
        #[arg(long)]
        compute: bool,
    },

    /// Edit fields of an existing order
    Edit {
        /// Order id
        id: String,

        #[command(flatten)]
        fields: FieldArgs,

        /// Recompute the derived balances before saving
        #[arg(long)]
        compute: bool,
    },

    /// Recompute an order's derived balances and save them
    Compute {
        /// Order id
        id: String,
    },

    /// Show one order in full
    Show {
        /// Order id
        id: String,
    },

    /// Delete an order
    Delete {
        /// Order id
        id: String,
    },
}

/// Field edits shared by `order create` and `order edit`. Only the flags that
/// are present touch the draft. Monetary flags take free text and parse
/// leniently: junk counts as 0, negatives pass through.
#[derive(Args, Default)]
pub struct FieldArgs {
    /// Case reference
    #[arg(long)]
    pub case: Option<String>,

    /// Order description
    #[arg(long)]
    pub order: Option<String>,

    /// Service type (e.g. INSTALACION, MANTENIMIENTO)
    #[arg(long)]
    pub service: Option<String>,

    /// Department
    #[arg(long)]
    pub department: Option<String>,

    /// Municipality
    #[arg(long)]
    pub municipality: Option<String>,

    /// Difficulty code (DDA)
    #[arg(long)]
    pub difficulty: Option<String>,

    /// Beneficiary (technician)
    #[arg(long)]
    pub beneficiary: Option<String>,

    /// Service date, D/M/Y (or Y-M-D picker form, converted on entry)
    #[arg(long)]
    pub date: Option<String>,

    /// Minute/act reference
    #[arg(long)]
    pub acta: Option<String>,

    /// Free-text observation
    #[arg(long)]
    pub observation: Option<String>,

    /// Status: abierto/open, pendiente/pending, cerrado/closed
    #[arg(long)]
    pub status: Option<String>,

    /// Labor value
    #[arg(long)]
    pub labor: Option<String>,

    /// Additional-day value
    #[arg(long)]
    pub additional_day: Option<String>,

    /// Failed-visit value
    #[arg(long)]
    pub failed_visit: Option<String>,

    /// Civil-works value
    #[arg(long)]
    pub civil_works: Option<String>,

    /// Excess-transport value
    #[arg(long)]
    pub transport: Option<String>,

    /// Advance already paid out
    #[arg(long)]
    pub advance: Option<String>,

    /// IVA amount
    #[arg(long)]
    pub iva: Option<String>,

    /// Withholding at source (retención en la fuente)
    #[arg(long)]
    pub rete_fuente: Option<String>,

    /// ICA withholding
    #[arg(long)]
    pub rete_ica: Option<String>,

    /// Other discounts / parafiscal deductions
    #[arg(long)]
    pub other_discounts: Option<String>,
}

/// Listing filters shared by `list` and `export`.
#[derive(Args, Default)]
pub struct FilterArgs {
    /// Free-text search over case, beneficiary and department
    #[arg(long)]
    pub search: Option<String>,

    /// Filter by case reference
    #[arg(long)]
    pub case: Option<String>,

    /// Filter by service type
    #[arg(long)]
    pub service: Option<String>,

    /// Filter by department or municipality
    #[arg(long)]
    pub location: Option<String>,

    /// Filter by beneficiary (technician)
    #[arg(long)]
    pub beneficiary: Option<String>,

    /// Filter by status
    #[arg(long)]
    pub status: Option<String>,

    /// Start of service-date range (YYYY-MM-DD)
    #[arg(long)]
    pub from: Option<String>,

    /// End of service-date range (YYYY-MM-DD)
    #[arg(long)]
    pub to: Option<String>,
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let config = StoreConfig::resolve(self.database.clone());
        let session = Session::at(session_path(&config));

        let needs_auth = !matches!(
            self.command,
            Commands::Init | Commands::Login { .. } | Commands::Logout
        );
        if needs_auth && !session.is_authenticated() {
            return Err(AppError::NotAuthenticated.into());
        }

        match self.command {
            Commands::Init => {
                let path = config.database.clone().context(
                    "No database path configured. Pass --database or set SALDO_DB",
                )?;
                SqliteStore::init(&path).await?;
                println!("Database initialized: {}", path);
            }

            Commands::Login { username, password } => {
                session.login(&StaticCredentials::default(), &username, &password)?;
                println!("Logged in as {}", username);
            }

            Commands::Logout => {
                session.logout()?;
                println!("Logged out");
            }

            Commands::Order(order_cmd) => {
                let mut service = load_service(&config, self.verbose).await?;
                run_order_command(&mut service, order_cmd).await?;
            }

            Commands::List { filters } => {
                let service = load_service(&config, self.verbose).await?;
                let filter = filters.into_filter()?;
                print_order_table(&service.filtered(&filter));
            }

            Commands::Dashboard { from, to, format } => {
                let service = load_service(&config, self.verbose).await?;
                let filter = OrderFilter {
                    from: from.as_deref().map(parse_picker_date).transpose()?,
                    to: to.as_deref().map(parse_picker_date).transpose()?,
                    ..Default::default()
                };
                let summary = dashboard::summarize(&service.filtered(&filter));
                match format.as_str() {
                    "json" => println!("{}", serde_json::to_string_pretty(&summary)?),
                    _ => print_dashboard(&summary),
                }
            }

            Commands::Export { output, filters } => {
                let service = load_service(&config, self.verbose).await?;
                let filter = filters.into_filter()?;
                let orders = service.filtered(&filter);
                run_export_command(&orders, output.as_deref())?;
            }
        }

        Ok(())
    }
}

/// The session marker lives next to the database so separate ledgers keep
/// separate logins; without a database it sits in the working directory.
fn session_path(config: &StoreConfig) -> PathBuf {
    match &config.database {
        Some(path) => PathBuf::from(format!("{}.session", path)),
        None => PathBuf::from("saldo.session"),
    }
}

async fn load_service(config: &StoreConfig, verbose: bool) -> Result<OrderService<Backend>> {
    let backend = Backend::open(config).await;
    let service = OrderService::load(backend).await?;
    if verbose {
        eprintln!("[saldo] {} order(s) loaded", service.orders().len());
    }
    Ok(service)
}

async fn run_order_command(
    service: &mut OrderService<Backend>,
    cmd: OrderCommands,
) -> Result<()> {
    match cmd {
        OrderCommands::Create { fields, compute } => {
            let mut draft = service.new_draft();
            apply_edits(&mut draft, &fields)?;
            if compute {
                draft.recompute();
                print_balances(&draft);
            }
            let id = draft.id.clone();
            match service.save(draft).await {
                SaveOutcome::Saved => println!("Created order {}", id),
                SaveOutcome::RolledBack { error } => {
                    eprintln!("Could not save order {}: {}", id, error);
                    eprintln!("The order was not persisted.");
                }
            }
        }

        OrderCommands::Edit {
            id,
            fields,
            compute,
        } => {
            let mut draft = service.open_draft(&id)?;
            apply_edits(&mut draft, &fields)?;
            if compute {
                draft.recompute();
                print_balances(&draft);
            }
            match service.save(draft).await {
                SaveOutcome::Saved => println!("Saved order {}", id),
                SaveOutcome::RolledBack { error } => {
                    eprintln!("Could not save order {}: {}", id, error);
                    eprintln!("Your changes were discarded.");
                }
            }
        }

        OrderCommands::Compute { id } => {
            let mut draft = service.open_draft(&id)?;
            draft.recompute();
            print_balances(&draft);
            match service.save(draft).await {
                SaveOutcome::Saved => println!("Updated balances for order {}", id),
                SaveOutcome::RolledBack { error } => {
                    eprintln!("Could not save order {}: {}", id, error);
                }
            }
        }

        OrderCommands::Show { id } => {
            let order = service.get(&id)?;
            print_order(order);
        }

        OrderCommands::Delete { id } => match service.delete(&id).await? {
            DeleteOutcome::Deleted => println!("Deleted order {}", id),
            DeleteOutcome::Resynced { error } => {
                eprintln!("Could not delete order {}: {}", id, error);
                eprintln!("The order list was reloaded from the store.");
            }
        },
    }
    Ok(())
}

fn apply_edits(order: &mut ServiceOrder, edits: &FieldArgs) -> Result<(), AppError> {
    if let Some(value) = &edits.case {
        order.case_id = value.clone();
    }
    if let Some(value) = &edits.order {
        order.order_description = value.clone();
    }
    if let Some(value) = &edits.service {
        order.service_type = value.clone();
    }
    if let Some(value) = &edits.department {
        order.department = value.clone();
    }
    if let Some(value) = &edits.municipality {
        order.municipality = value.clone();
    }
    if let Some(value) = &edits.difficulty {
        order.difficulty = value.clone();
    }
    if let Some(value) = &edits.beneficiary {
        order.beneficiary = value.clone();
    }
    if let Some(value) = &edits.date {
        // Picker-form input (Y-M-D) is converted; D/M/Y passes through.
        order.date = dates::from_picker_date(value);
    }
    if let Some(value) = &edits.acta {
        order.acta = value.clone();
    }
    if let Some(value) = &edits.observation {
        order.observation = value.clone();
    }
    if let Some(value) = &edits.status {
        order.status = OrderStatus::from_str(value)
            .ok_or_else(|| AppError::InvalidStatus(value.clone()))?;
    }

    if let Some(value) = &edits.labor {
        order.value_labor = parse_pesos(value);
    }
    if let Some(value) = &edits.additional_day {
        order.value_additional_day = parse_pesos(value);
    }
    if let Some(value) = &edits.failed_visit {
        order.value_failed_visit = parse_pesos(value);
    }
    if let Some(value) = &edits.civil_works {
        order.value_civil_works = parse_pesos(value);
    }
    if let Some(value) = &edits.transport {
        order.value_transport = parse_pesos(value);
    }
    if let Some(value) = &edits.advance {
        order.advance_amount = parse_pesos(value);
    }
    if let Some(value) = &edits.iva {
        order.iva = parse_pesos(value);
    }
    if let Some(value) = &edits.rete_fuente {
        order.rete_fuente = parse_pesos(value);
    }
    if let Some(value) = &edits.rete_ica {
        order.rete_ica = parse_pesos(value);
    }
    if let Some(value) = &edits.other_discounts {
        order.other_discounts = parse_pesos(value);
    }

    Ok(())
}

impl FilterArgs {
    fn into_filter(self) -> Result<OrderFilter> {
        let status = self
            .status
            .map(|s| OrderStatus::from_str(&s).ok_or(AppError::InvalidStatus(s)))
            .transpose()?;

        Ok(OrderFilter {
            search: self.search,
            case_id: self.case,
            service_type: self.service,
            location: self.location,
            beneficiary: self.beneficiary,
            status,
            from: self.from.as_deref().map(parse_picker_date).transpose()?,
            to: self.to.as_deref().map(parse_picker_date).transpose()?,
        })
    }
}

fn run_export_command(orders: &[&ServiceOrder], output: Option<&str>) -> Result<()> {
    use std::fs::File;
    use std::io::{Write, stdout};

    let writer: Box<dyn Write> = match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path))?;
            Box::new(file)
        }
        None => Box::new(stdout()),
    };

    let count = crate::io::export_orders_csv(writer, orders)?;
    if output.is_some() {
        eprintln!("Exported {} order(s)", count);
    }
    Ok(())
}

fn print_order_table(orders: &[&ServiceOrder]) {
    if orders.is_empty() {
        println!("No orders found.");
        return;
    }

    println!(
        "{:<36} {:<12} {:<12} {:<15} {:<18} {:<18} {:>12} {:>12} {:<10}",
        "ID", "CASE", "DATE", "SERVICE", "LOCATION", "BENEFICIARY", "ADVANCE", "TO PAY", "STATUS"
    );
    println!("{}", "-".repeat(150));

    for order in orders {
        let location = if order.municipality.is_empty() {
            order.department.clone()
        } else {
            format!("{} ({})", order.municipality, truncate(&order.department, 8))
        };
        println!(
            "{:<36} {:<12} {:<12} {:<15} {:<18} {:<18} {:>12} {:>12} {:<10}",
            order.id,
            truncate(&order.case_id, 12),
            truncate(&order.date, 12),
            truncate(&order.service_type, 15),
            truncate(&location, 18),
            truncate(&order.beneficiary, 18),
            format_pesos(order.advance_amount),
            format_pesos(order.balance_to_pay),
            order.status
        );
    }
}

fn print_order(order: &ServiceOrder) {
    println!("Order: {}", order.id);
    println!();
    println!("  Description");
    println!("    Case:          {}", order.case_id);
    println!("    Order:         {}", order.order_description);
    println!("    Service:       {}", order.service_type);
    println!("    Department:    {}", order.department);
    println!("    Municipality:  {}", order.municipality);
    println!("    Difficulty:    {}", order.difficulty);
    println!("    Beneficiary:   {}", order.beneficiary);
    println!("    Date:          {}", order.date);
    println!("    Acta:          {}", order.acta);
    println!();
    println!("  Advance");
    println!("    Advance:       {}", format_pesos(order.advance_amount));
    println!();
    println!("  Service billing");
    println!("    Labor:         {}", format_pesos(order.value_labor));
    println!(
        "    Add. day:      {}",
        format_pesos(order.value_additional_day)
    );
    println!(
        "    Failed visit:  {}",
        format_pesos(order.value_failed_visit)
    );
    println!(
        "    Civil works:   {}",
        format_pesos(order.value_civil_works)
    );
    println!("    Transport:     {}", format_pesos(order.value_transport));
    println!();
    println!("  Taxes and withholdings");
    println!("    IVA:           {}", format_pesos(order.iva));
    println!("    Rete fuente:   {}", format_pesos(order.rete_fuente));
    println!("    Rete ICA:      {}", format_pesos(order.rete_ica));
    println!(
        "    Other disc.:   {}",
        format_pesos(order.other_discounts)
    );
    println!();
    println!("  Balances");
    print_balances(order);
    println!();
    println!("  Status:        {}", order.status);
    if !order.observation.is_empty() {
        println!("  Observation:   {}", order.observation);
    }
}

fn print_balances(order: &ServiceOrder) {
    println!(
        "    Subtotal (no transport):  {:>14}",
        format_pesos(order.subtotal_service)
    );
    println!(
        "    Total service:            {:>14}",
        format_pesos(order.total_service)
    );
    println!(
        "    Labor balance:            {:>14}",
        format_pesos(order.balance_labor)
    );
    println!(
        "    Net to pay:               {:>14}",
        format_pesos(order.balance_to_pay)
    );
}

fn print_dashboard(summary: &DashboardSummary) {
    println!("Orders:             {}", summary.total_orders);
    println!("Active technicians: {}", summary.active_technicians);
    println!();
    println!("  Open:     {:>6}", summary.open_orders);
    println!("  Pending:  {:>6}", summary.pending_orders);
    println!("  Closed:   {:>6}", summary.closed_orders);
    println!();
    println!(
        "Total invoiced:     {:>14}",
        format_pesos(summary.total_invoiced)
    );
    println!(
        "Balance to pay:     {:>14}",
        format_pesos(summary.total_balance_to_pay)
    );

    if !summary.by_department.is_empty() {
        println!();
        println!("By department:");
        for group in &summary.by_department {
            println!("  {:<24} {:>6}", display_name(&group.name), group.count);
        }
    }

    if !summary.by_service_type.is_empty() {
        println!();
        println!("By service type:");
        for group in &summary.by_service_type {
            println!("  {:<24} {:>6}", display_name(&group.name), group.count);
        }
    }
}

fn display_name(name: &str) -> &str {
    if name.is_empty() { "(none)" } else { name }
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}

fn parse_picker_date(date_str: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d").context("Date must be in YYYY-MM-DD format")
}
