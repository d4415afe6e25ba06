use crate::cli::{AlertCommands, Commands, IncidentCommands};
use futures::StreamExt;
use serde_json::Value;
use soc_client::api::{agent, alerts, incidents};
use soc_client::time::{format_date_time, MISSING};
use soc_client::{
    calculate_ttr, format_date_time_with_offset, parse_to_date, ApiClient, ClientConfig,
    ClientError, RecordPage, TimeInput,
};

pub async fn run(command: Commands) -> Result<(), ClientError> {
    match command {
        Commands::Alerts { command } => run_alerts(command).await,
        Commands::Incidents {
            command: IncidentCommands::List(args),
        } => {
            let page = incidents::list_incidents(&client()?, &args.to_query()).await?;
            print_page(&page, args.json)
        }
        Commands::Chat {
            message,
            alert_id,
            blocking,
        } => {
            let message = agent::ChatMessage { alert_id, message };
            chat(&client()?, &message, blocking).await
        }
        Commands::Time { value } => show_time(&value),
        Commands::Ttr {
            create,
            close,
            status,
        } => {
            println!("{}", calculate_ttr(create, close, status.as_deref()));
            Ok(())
        }
    }
}

fn client() -> Result<ApiClient, ClientError> {
    let client = ApiClient::new(ClientConfig::from_env())?.with_unauthorized_hook(|| {
        eprintln!("session rejected; log in again and set SOC_TOKEN");
    });
    Ok(client)
}

async fn run_alerts(command: AlertCommands) -> Result<(), ClientError> {
    let client = client()?;
    match command {
        AlertCommands::List(args) => {
            let page = alerts::list_alerts(&client, &args.to_query()).await?;
            print_page(&page, args.json)
        }
        AlertCommands::Show { id, workspace } => {
            let detail = alerts::get_alert(&client, &id, workspace.as_deref()).await?;
            println!("{}", serde_json::to_string_pretty(&detail)?);
            Ok(())
        }
        AlertCommands::Close {
            id,
            category,
            notes,
            workspace,
        } => {
            alerts::close_alert(
                &client,
                &id,
                &category,
                notes.as_deref(),
                workspace.as_deref(),
            )
            .await?;
            tracing::info!(alert_id = %id, %category, "alert closed");
            println!("closed {id}");
            Ok(())
        }
        AlertCommands::Open { id, workspace } => {
            alerts::open_alert(&client, &id, workspace.as_deref()).await?;
            tracing::info!(alert_id = %id, "alert reopened");
            println!("opened {id}");
            Ok(())
        }
    }
}

fn text(value: &Value) -> String {
    match value {
        Value::Null => MISSING.to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn print_page(page: &RecordPage, json: bool) -> Result<(), ClientError> {
    if json {
        println!("{}", serde_json::to_string(page)?);
        return Ok(());
    }
    for record in &page.data {
        println!(
            "{}\t{}\t{}\t{}\t{}\t{}",
            text(&record.id),
            record.risk_level,
            record.status,
            format_date_time(TimeInput::from_json(Some(&record.create_time))),
            record.response_time,
            text(&record.title),
        );
    }
    println!("total: {}", page.total);
    Ok(())
}

async fn chat(
    client: &ApiClient,
    message: &agent::ChatMessage,
    blocking: bool,
) -> Result<(), ClientError> {
    if blocking {
        let answer = agent::send_message(client, message).await?;
        println!("{}", serde_json::to_string_pretty(&answer)?);
        return Ok(());
    }

    let mut events = std::pin::pin!(agent::stream_message(client, message).await?);
    while let Some(event) = events.next().await {
        println!("{}", event?);
    }
    Ok(())
}

fn show_time(value: &str) -> Result<(), ClientError> {
    let Some(at) = parse_to_date(value) else {
        return Err(ClientError::InvalidRequest(format!(
            "unparseable timestamp '{value}'"
        )));
    };
    println!(
        "wire:    {}",
        format_date_time_with_offset(at).unwrap_or_else(|| MISSING.to_string())
    );
    println!("display: {}", format_date_time(at));
    println!("utc:     {}", at.to_rfc3339());
    Ok(())
}
