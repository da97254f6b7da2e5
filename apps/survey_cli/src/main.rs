use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use client_core::{
    build_payload, config::load_settings, FormEvent, FormHandle, FormRuntime, FormView,
    HttpLocationDirectory, HttpSubmissionClient, MouzaField, NoticeKind, SubmissionStatus,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Fill in the mouza survey form from the command line and submit it.
#[derive(Parser, Debug)]
struct Args {
    #[arg(long)]
    division: String,
    #[arg(long)]
    district: Option<String>,
    #[arg(long)]
    upazila: Option<String>,
    #[arg(long, default_value = "")]
    union: String,
    /// Repeatable: "mouza name|survey type|sheet number".
    #[arg(long = "mouza", value_parser = parse_mouza)]
    mouzas: Vec<MouzaArg>,
    /// Overrides the configured directory base url.
    #[arg(long)]
    directory_url: Option<String>,
    /// Overrides the configured submission url.
    #[arg(long)]
    submit_url: Option<String>,
    /// Print the payload without submitting it.
    #[arg(long)]
    dry_run: bool,
}

#[derive(Debug, Clone)]
struct MouzaArg {
    name: String,
    survey_type: String,
    sheet_number: String,
}

fn parse_mouza(raw: &str) -> Result<MouzaArg, String> {
    let parts: Vec<&str> = raw.split('|').map(str::trim).collect();
    match parts.as_slice() {
        [name, survey_type, sheet_number] => Ok(MouzaArg {
            name: name.to_string(),
            survey_type: survey_type.to_string(),
            sheet_number: sheet_number.to_string(),
        }),
        _ => Err(format!(
            "expected 'name|survey type|sheet number', got '{raw}'"
        )),
    }
}

async fn step(handle: &mut FormHandle, event: FormEvent) -> Result<FormView> {
    let view = handle.settle(event).await?;
    if let Some(err) = &view.rejection {
        bail!("{err}");
    }
    if let Some(notice) = &view.notice {
        if notice.kind == NoticeKind::NetworkFailure {
            bail!("{}", notice.message);
        }
    }
    Ok(view)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    let args = Args::parse();

    let mut settings = load_settings()?;
    if let Some(url) = args.directory_url.clone() {
        settings.directory_base_url = url;
    }
    if let Some(url) = args.submit_url.clone() {
        settings.submit_url = url;
    }
    settings.validate()?;

    let directory = HttpLocationDirectory::new(&settings.directory_base_url)
        .context("failed to build directory client")?;
    let endpoint = HttpSubmissionClient::new(&settings.submit_url)
        .context("failed to build submission client")?;
    let (runtime, mut handle) = FormRuntime::new(Arc::new(directory), Arc::new(endpoint));
    let worker = tokio::spawn(runtime.run());

    let view = step(&mut handle, FormEvent::Opened).await?;
    info!(divisions = view.divisions.len(), "divisions loaded");

    let view = step(&mut handle, FormEvent::DivisionSelected(args.division.clone())).await?;
    info!(districts = ?view.districts, "districts loaded");

    if let Some(district) = &args.district {
        let view = step(&mut handle, FormEvent::DistrictSelected(district.clone())).await?;
        info!(upazilas = ?view.upazilas, "upazilas loaded");
    }
    if let Some(upazila) = &args.upazila {
        step(&mut handle, FormEvent::UpazilaSelected(upazila.clone())).await?;
    }
    step(&mut handle, FormEvent::UnionChanged(args.union.clone())).await?;

    for mouza in &args.mouzas {
        let view = step(&mut handle, FormEvent::MouzaAdded).await?;
        let position = view.mouzas.len() - 1;
        for (field, value) in [
            (MouzaField::MouzaName, &mouza.name),
            (MouzaField::SurveyType, &mouza.survey_type),
            (MouzaField::SheetNumber, &mouza.sheet_number),
        ] {
            step(
                &mut handle,
                FormEvent::MouzaFieldEdited {
                    position,
                    field,
                    value: value.clone(),
                },
            )
            .await
            .with_context(|| format!("mouza #{} {}", position + 1, field.name()))?;
        }
    }

    let view = handle.view();
    let payload = build_payload(&view.selection, &view.mouzas);
    println!("{}", serde_json::to_string_pretty(&payload)?);

    if !args.dry_run {
        let view = handle.settle(FormEvent::SubmitRequested).await?;
        match view.submission {
            SubmissionStatus::Succeeded { message } => println!("{message}"),
            SubmissionStatus::Rejected { status, message } => {
                bail!("Error submitting form: {message} (HTTP {status})")
            }
            SubmissionStatus::Idle | SubmissionStatus::Pending => {
                let message = view
                    .notice
                    .map(|notice| notice.message)
                    .unwrap_or_else(|| "submission did not complete".to_string());
                bail!(message)
            }
        }
    }

    drop(handle);
    worker.await.context("form runtime panicked")?;
    Ok(())
}
