use chrono::{Days, Local, NaiveDate};
use clap::Args;
use huntpilot::error::AppError;
use huntpilot::workflows::applications::{
    ActivityForm, ApplicationForm, ApplicationStatus, ChecklistForm, InMemoryTrackerRepository,
    RoundForm, TemplateForm, TrackerRepository, TrackerService, TrackerServiceError, UserId,
};
use std::sync::Arc;

const DATE_FORMAT: &str = "%Y-%m-%d";

const COMPANIES: [&str; 18] = [
    "Acme",
    "BluePeak",
    "Nimbus",
    "ExampleCorp",
    "Delta Systems",
    "Orbit",
    "Copper",
    "Pinecone",
    "Quanta",
    "Sunset Labs",
    "Northwind",
    "Greenfield",
    "Aurora",
    "Vertex",
    "Zenith",
    "Atlas",
    "Horizon",
    "Keystone",
];

const ROLES: [&str; 6] = [
    "Software Engineer",
    "Full-Stack Engineer",
    "Backend Engineer",
    "Frontend Engineer",
    "Platform Engineer",
    "Data Engineer",
];

const SOURCES: [&str; 4] = ["LinkedIn", "Referral", "Company site", "Recruiter outreach"];
const LOCATIONS: [&str; 5] = ["Remote", "NYC", "SF Bay Area", "Austin", "Seattle"];
const TAGS: [&str; 8] = [
    "referral",
    "fast-track",
    "remote",
    "backend",
    "frontend",
    "platform",
    "startup",
    "enterprise",
];
const STATUSES: [&str; 5] = ["APPLIED", "OA", "INTERVIEW", "OFFER", "REJECTED"];
const PRIORITIES: [&str; 3] = ["LOW", "MEDIUM", "HIGH"];

const TEMPLATES: [(Option<&str>, &str, &str); 3] = [
    (
        Some("APPLIED"),
        "Applied follow-up (7 days)",
        "Hi {name},\n\nI applied for the {role} position last week and wanted to follow up to see if there's any additional information I can provide.\n\nThanks,\n{your_name}",
    ),
    (
        Some("INTERVIEW"),
        "Post-interview thank you",
        "Hi {name},\n\nThank you for your time today. I enjoyed learning more about the team and the role and would love to help.\n\nBest,\n{your_name}",
    ),
    (
        None,
        "Referral intro nudge",
        "Hi {name},\n\nHope you're doing well. I wanted to follow up on the referral intro and am happy to share any additional context.\n\nThanks,\n{your_name}",
    ),
];

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Reporting date (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Owner id for the seeded records
    #[arg(long)]
    pub(crate) owner: Option<String>,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());
    let owner = UserId(
        args.owner
            .unwrap_or_else(|| "demo@huntpilot.local".to_string()),
    );

    let service = TrackerService::new(Arc::new(InMemoryTrackerRepository::default()));
    let seeded = seed_demo_data(&service, &owner, today)?;

    println!("HuntPilot demo for {owner} as of {today}");
    println!("Seeded {seeded} applications.");
    render_demo(&service, &owner, today)?;
    Ok(())
}

fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Populate a tracker with a deterministic spread of applications.
pub(crate) fn seed_demo_data<R>(
    service: &TrackerService<R>,
    owner: &UserId,
    today: NaiveDate,
) -> Result<usize, TrackerServiceError>
where
    R: TrackerRepository + 'static,
{
    for (status, title, body) in TEMPLATES {
        service.create_template(
            owner,
            &TemplateForm {
                status: status.map(str::to_string),
                title: title.to_string(),
                body: body.to_string(),
            },
        )?;
    }

    for (index, company) in COMPANIES.iter().enumerate() {
        let status = STATUSES[index % STATUSES.len()];
        let date_applied = today - Days::new(3 + 2 * index as u64);
        let last_contacted = (status != "APPLIED")
            .then(|| date_applied + Days::new(10.min(2 + (index % 6)) as u64));
        let tags: Vec<&str> = (0..3)
            .map(|offset| TAGS[(index * 3 + offset * 5) % TAGS.len()])
            .collect();

        let application = service.create_application(
            owner,
            &ApplicationForm {
                company: company.to_string(),
                role: ROLES[index % ROLES.len()].to_string(),
                location: LOCATIONS[index % LOCATIONS.len()].to_string(),
                application_link: format!(
                    "https://example.com/jobs/{}",
                    company.to_lowercase().replace(' ', "-")
                ),
                status: status.to_string(),
                priority: PRIORITIES[index % PRIORITIES.len()].to_string(),
                salary_range: (index % 3 == 0).then(|| "$120k - $160k".to_string()),
                source: SOURCES[index % SOURCES.len()].to_string(),
                date_applied: format_date(date_applied),
                last_contacted: last_contacted.map(format_date),
                notes: (index % 4 == 0).then(|| {
                    "Focus areas:\n- System design\n- Async patterns\n- Observability".to_string()
                }),
                tags: Some(tags.join(",")),
            },
        )?;

        if let Some(contacted) = last_contacted {
            service.log_activity(
                owner,
                &application.id,
                &ActivityForm {
                    kind: "CONTACTED".to_string(),
                    occurred_at: format_date(contacted),
                    title: format!("Contacted / check-in · {}", application.company),
                },
            )?;
        }

        if application.status == ApplicationStatus::Interview {
            let round = service.add_interview_round(
                owner,
                &application.id,
                &RoundForm {
                    round_number: Some("1".to_string()),
                    scheduled_at: Some(format!("{}T10:00", format_date(date_applied + Days::new(7)))),
                    notes: Some("Round 1: recruiter screen.\nPrep: STAR stories + role alignment.".to_string()),
                },
            )?;
            let items = [
                (None, "Review job description highlights", true),
                (Some(&round.id), "Prepare intro + recent project deep dive", false),
                (Some(&round.id), "Write 5 questions to ask interviewer", true),
            ];
            for (round_id, text, done) in items {
                let item = service.add_checklist_item(
                    owner,
                    &application.id,
                    &ChecklistForm {
                        round_id: round_id.map(|id| id.0.clone()),
                        text: text.to_string(),
                    },
                )?;
                if done {
                    service.toggle_checklist_item(owner, &application.id, &item.id)?;
                }
            }
        } else {
            let items = [
                ("Collect role-specific talking points", index % 2 == 0),
                ("Update resume bullets for this role", index % 3 == 0),
            ];
            for (text, done) in items {
                let item = service.add_checklist_item(
                    owner,
                    &application.id,
                    &ChecklistForm {
                        round_id: None,
                        text: text.to_string(),
                    },
                )?;
                if done {
                    service.toggle_checklist_item(owner, &application.id, &item.id)?;
                }
            }
        }

        if application.status != ApplicationStatus::Rejected && index % 4 == 0 {
            // Completing moves the contact date, so only do it for follow-ups already due.
            let due = application.follow_up(today);
            if due.is_some_and(|due| due.due_at <= today) {
                service.complete_follow_up(owner, &application.id, today)?;
            }
        }
    }

    Ok(COMPANIES.len())
}

fn render_demo<R>(
    service: &TrackerService<R>,
    owner: &UserId,
    today: NaiveDate,
) -> Result<(), TrackerServiceError>
where
    R: TrackerRepository + 'static,
{
    let dashboard = service.dashboard(owner, today)?;
    println!(
        "\nPipeline: {} applications, {} interviewing, {} offers, {} follow-ups overdue",
        dashboard.total, dashboard.in_interview, dashboard.offers, dashboard.follow_ups_overdue
    );

    println!("\nFollow-up queue");
    let queue = service.follow_up_queue(owner, today)?;
    if queue.is_empty() {
        println!("  Nothing due.");
    }
    for entry in &queue {
        println!(
            "  {:<14} {:<20} {:<9} due {}  {}",
            entry.company, entry.role, entry.status, entry.due_at, entry.urgency_label
        );
    }

    println!("\nUpcoming interviews");
    let schedule = service.interview_schedule(owner)?;
    for entry in schedule.scheduled.iter().chain(&schedule.unscheduled) {
        let when = entry
            .scheduled_at
            .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "unscheduled".to_string());
        println!(
            "  {:<14} round {} at {}  prep {}/{}",
            entry.company, entry.round_number, when, entry.progress.done, entry.progress.total
        );
    }

    let analytics = service.analytics(owner, today)?;
    println!(
        "\nResponse rate: {} ({} of {} moved past APPLIED)",
        analytics.response_rate_label, analytics.responded, analytics.total
    );
    for count in &analytics.status_counts {
        println!("  {:<9} {}", count.status, count.count);
    }

    Ok(())
}
