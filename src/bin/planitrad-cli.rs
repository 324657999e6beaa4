#![forbid(unsafe_code)]
use anyhow::{bail, Context, Result};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Utc};
use clap::{Parser, Subcommand};
use planitrad::{
    io,
    model::{
        AllocationMode, AllocationRequest, Blockage, PlanEntry, Task, TaskId, Translator,
    },
    planner::{DetectOptions, Planner},
    storage::{JsonStorage, Storage},
    WorkCalendar,
};
#[cfg(feature = "logging")]
use tracing_subscriber::{fmt::Subscriber, EnvFilter};

/// CLI minimaliste de planification de traducteurs (sans base de données)
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Active les logs (feature `logging`)
    #[arg(long, global = true)]
    log: bool,

    /// Fichier JSON d'agenda
    #[arg(long, global = true, default_value = "agenda.json")]
    agenda: String,

    /// Date du jour (YYYY-MM-DD), par défaut la date UTC courante.
    /// Pratique pour des prévisualisations reproductibles.
    #[arg(long, global = true)]
    today: Option<String>,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Ajouter un traducteur
    AddTranslator {
        #[arg(long)]
        handle: String,
        #[arg(long)]
        name: String,
        /// HH:MM
        #[arg(long)]
        work_start: Option<String>,
        /// HH:MM
        #[arg(long)]
        work_end: Option<String>,
        /// HH:MM-HH:MM, "none" pour aucune pause
        #[arg(long)]
        lunch: Option<String>,
        #[arg(long)]
        daily_capacity: Option<f64>,
    },

    /// Importer des traducteurs depuis un CSV
    ImportTranslators {
        #[arg(long)]
        csv: String,
    },

    /// Importer des blocages depuis un CSV
    ImportBlockages {
        #[arg(long)]
        csv: String,
    },

    /// Déclarer un blocage (jour entier par défaut)
    AddBlockage {
        #[arg(long)]
        handle: String,
        /// YYYY-MM-DD
        #[arg(long)]
        date: String,
        /// Intervalle HH:MM-HH:MM ; omis = jour entier
        #[arg(long)]
        range: Option<String>,
        #[arg(long, default_value = "")]
        reason: String,
    },

    /// Prévisualiser un plan sans l'enregistrer
    Preview {
        #[arg(long)]
        handle: String,
        #[arg(long)]
        hours: f64,
        /// YYYY-MM-DD ou YYYY-MM-DDTHH:MM
        #[arg(long)]
        due: String,
        /// backward|forward|uniform
        #[arg(long, default_value = "backward")]
        mode: String,
        #[arg(long)]
        start: Option<String>,
        #[arg(long)]
        end: Option<String>,
    },

    /// Créer (ou recalculer) une tâche et ses réservations
    Commit {
        /// Id de tâche existant à recalculer ; omis = nouvelle tâche
        #[arg(long)]
        task_id: Option<String>,
        #[arg(long)]
        handle: String,
        #[arg(long)]
        hours: f64,
        /// YYYY-MM-DD ou YYYY-MM-DDTHH:MM
        #[arg(long)]
        due: String,
        /// backward|forward|uniform|manual
        #[arg(long, default_value = "backward")]
        mode: String,
        #[arg(long)]
        start: Option<String>,
        #[arg(long)]
        end: Option<String>,
        /// Mode manual : liste "YYYY-MM-DD=heures,YYYY-MM-DD=heures"
        #[arg(long)]
        entries: Option<String>,
    },

    /// Marquer une tâche terminée et libérer ses réservations futures
    Complete {
        #[arg(long)]
        task_id: String,
        /// YYYY-MM-DD, par défaut aujourd'hui
        #[arg(long)]
        on: Option<String>,
    },

    /// Supprimer une tâche et ses réservations
    DeleteTask {
        #[arg(long)]
        task_id: String,
    },

    /// Lister les réservations de l'agenda
    List,

    /// Vérifier les conflits
    Check {
        /// Restreindre à un traducteur
        #[arg(long)]
        handle: Option<String>,
        #[arg(long, default_value_t = 37.5)]
        weekly_target: f64,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    #[cfg(feature = "logging")]
    if cli.log {
        let _ = Subscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .try_init();
    }

    let today = match &cli.today {
        Some(raw) => parse_date(raw)?,
        None => Utc::now().date_naive(),
    };

    let storage = JsonStorage::open(&cli.agenda)?;
    let mut planner = Planner::new();
    *planner.agenda_mut() = storage.load_or_empty()?;

    let code = match cli.cmd {
        Commands::AddTranslator {
            handle,
            name,
            work_start,
            work_end,
            lunch,
            daily_capacity,
        } => {
            let standard = WorkCalendar::standard();
            let work_start = match work_start {
                Some(raw) => io::parse_time(&raw)?,
                None => standard.work_start,
            };
            let work_end = match work_end {
                Some(raw) => io::parse_time(&raw)?,
                None => standard.work_end,
            };
            let lunch = match lunch.as_deref() {
                Some("none") => None,
                Some(raw) => Some(io::parse_time_range(raw)?),
                None => standard.lunch(),
            };
            let capacity = daily_capacity.unwrap_or(standard.daily_capacity_hours);
            let calendar =
                WorkCalendar::new(work_start, work_end, lunch, capacity).map_err(anyhow::Error::msg)?;
            let translator = Translator::new(handle, name, calendar);
            println!("{}", translator.id.as_str());
            planner.add_translators(vec![translator]);
            storage.save(planner.agenda())?;
            0
        }
        Commands::ImportTranslators { csv } => {
            let translators = io::import_translators_csv(csv)?;
            planner.add_translators(translators);
            storage.save(planner.agenda())?;
            0
        }
        Commands::ImportBlockages { csv } => {
            let blockages = io::import_blockages_csv(csv, planner.agenda())?;
            for b in blockages {
                planner.add_blockage(b)?;
            }
            storage.save(planner.agenda())?;
            0
        }
        Commands::AddBlockage {
            handle,
            date,
            range,
            reason,
        } => {
            let translator = resolve_handle(&planner, &handle)?;
            let date = parse_date(&date)?;
            let blockage = match range {
                Some(raw) => {
                    let (start, end) = io::parse_time_range(&raw)?;
                    Blockage::partial(translator, date, start, end, reason)
                        .map_err(anyhow::Error::msg)?
                }
                None => Blockage::full_day(translator, date, reason),
            };
            planner.add_blockage(blockage)?;
            storage.save(planner.agenda())?;
            0
        }
        Commands::Preview {
            handle,
            hours,
            due,
            mode,
            start,
            end,
        } => {
            let request = AllocationRequest {
                translator: resolve_handle(&planner, &handle)?,
                total_hours: hours,
                due_date: parse_datetime(&due)?,
                mode: parse_mode(&mode)?,
                start_date: start.as_deref().map(parse_date).transpose()?,
                end_date: end.as_deref().map(parse_date).transpose()?,
            };
            let plan = planner.preview_allocation(&request, today)?;
            for entry in &plan.entries {
                println!("{} | {:.2}h", entry.date, entry.hours);
            }
            println!("total: {:.2}h", plan.total_hours());
            0
        }
        Commands::Commit {
            task_id,
            handle,
            hours,
            due,
            mode,
            start,
            end,
            entries,
        } => {
            let translator = resolve_handle(&planner, &handle)?;
            let mode = parse_mode(&mode)?;
            let mut task = Task::new(translator, hours, parse_datetime(&due)?, mode)
                .map_err(anyhow::Error::msg)?;
            if let Some(id) = task_id {
                task.id = TaskId::new(id);
            }
            task.start_date = start.as_deref().map(parse_date).transpose()?;
            task.end_date = end.as_deref().map(parse_date).transpose()?;
            let manual = entries.as_deref().map(parse_entries).transpose()?;
            let task_id = task.id.clone();
            planner.commit_task(task, manual, today)?;
            storage.save(planner.agenda())?;
            println!("{}", task_id.as_str());
            if let Some(t) = planner.agenda().find_task_by_id(&task_id) {
                if t.inconsistent {
                    eprintln!("warning: manual entries do not sum to the task total");
                }
            }
            0
        }
        Commands::Complete { task_id, on } => {
            let on = match on {
                Some(raw) => parse_date(&raw)?,
                None => today,
            };
            planner.complete_task(&TaskId::new(task_id), on)?;
            storage.save(planner.agenda())?;
            0
        }
        Commands::DeleteTask { task_id } => {
            planner.delete_task(&TaskId::new(task_id))?;
            storage.save(planner.agenda())?;
            0
        }
        Commands::List => {
            for r in &planner.agenda().reservations {
                let handle = planner
                    .agenda()
                    .find_translator_by_id(&r.translator)
                    .map(|t| t.handle.as_str())
                    .unwrap_or("-");
                let ranges: Vec<String> = r
                    .ranges
                    .iter()
                    .map(|range| format!("{}→{}", range.start, range.end))
                    .collect();
                println!(
                    "{} | {} | {} | {:.2}h | {}",
                    r.id.as_str(),
                    handle,
                    r.date,
                    r.hours,
                    ranges.join(", ")
                );
            }
            0
        }
        Commands::Check {
            handle,
            weekly_target,
        } => {
            let opts = DetectOptions {
                weekly_hours_target: weekly_target,
            };
            let conflicts = match handle {
                Some(h) => {
                    let id = resolve_handle(&planner, &h)?;
                    planner.detect_conflicts(&id, opts)?
                }
                None => planner.detect_all(opts),
            };
            if conflicts.is_empty() {
                println!("OK: no conflicts");
                0
            } else {
                eprintln!("Found {} conflict(s)", conflicts.len());
                for c in &conflicts {
                    let handle = planner
                        .agenda()
                        .find_translator_by_id(&c.translator)
                        .map(|t| t.handle.as_str())
                        .unwrap_or("-");
                    println!("{} | {} | {} | {}", handle, c.date, c.kind.as_str(), c.detail);
                }
                // Code 2 = WARNING/INCOMPLETE
                2
            }
        }
    };

    std::process::exit(code);
}

fn resolve_handle(planner: &Planner, handle: &str) -> Result<planitrad::TranslatorId> {
    planner
        .agenda()
        .find_translator_by_handle(handle)
        .map(|t| t.id.clone())
        .with_context(|| format!("unknown translator: {handle}"))
}

fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").with_context(|| format!("invalid date: {raw}"))
}

/// `YYYY-MM-DDTHH:MM` ou date seule (échéance à minuit : le jour même
/// n'offre alors aucune heure ouvrée).
fn parse_datetime(raw: &str) -> Result<NaiveDateTime> {
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M") {
        return Ok(dt);
    }
    let date = parse_date(raw)?;
    Ok(date.and_time(NaiveTime::MIN))
}

fn parse_mode(raw: &str) -> Result<AllocationMode> {
    match raw.to_ascii_lowercase().as_str() {
        "backward" | "jat" => Ok(AllocationMode::Backward),
        "forward" | "peps" => Ok(AllocationMode::Forward),
        "uniform" | "equilibre" | "équilibré" => Ok(AllocationMode::Uniform),
        "manual" | "manuel" => Ok(AllocationMode::Manual),
        other => bail!("unknown allocation mode: {other}"),
    }
}

fn parse_entries(raw: &str) -> Result<Vec<PlanEntry>> {
    raw.split(',')
        .filter(|chunk| !chunk.trim().is_empty())
        .map(|chunk| {
            let Some((date_raw, hours_raw)) = chunk.trim().split_once('=') else {
                bail!("expected YYYY-MM-DD=hours, got: {chunk}");
            };
            let date = parse_date(date_raw.trim())?;
            let hours: f64 = hours_raw
                .trim()
                .parse()
                .with_context(|| format!("invalid hours: {hours_raw}"))?;
            Ok(PlanEntry { date, hours })
        })
        .collect()
}
