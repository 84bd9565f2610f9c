//! `countdown`: exam countdown and study-cycle position.

use anyhow::Result;
use chrono::{Local, NaiveDate};
use clap::Args;

use crate::cli::output::{output, CommandOutput};
use crate::domain::models::{AnchorSource, Config, CycleAnchors};
use crate::services::{CalendarSnapshot, StudyCalendar};

#[derive(Args, Debug)]
pub struct CountdownArgs {
    /// Exam name from the `exams` config section; nearest upcoming when omitted
    pub exam: Option<String>,

    /// Evaluate as of this date (YYYY-MM-DD) instead of today
    #[arg(long)]
    pub today: Option<NaiveDate>,

    /// Explicit study-cycle start date
    #[arg(long)]
    pub cycle_start: Option<NaiveDate>,

    /// Date of the first study session
    #[arg(long)]
    pub first_session: Option<NaiveDate>,

    /// Account creation date
    #[arg(long)]
    pub account_created: Option<NaiveDate>,
}

impl CommandOutput for CalendarSnapshot {
    fn to_human(&self) -> String {
        let countdown = &self.countdown;
        let exam_line = if countdown.exam_passed {
            format!("{} ({}): exam date has passed", self.exam, countdown.exam_date)
        } else {
            format!(
                "{} ({}): {} days left ({} weeks, {} days)",
                self.exam,
                countdown.exam_date,
                console::style(countdown.days_remaining).bold(),
                countdown.weeks_remaining,
                countdown.extra_days
            )
        };

        let cycle = &self.cycle;
        let anchor = match cycle.anchor_source {
            AnchorSource::Override => "cycle start override",
            AnchorSource::FirstSession => "first study session",
            AnchorSource::AccountCreated => "account creation",
            AnchorSource::Today => "today",
        };
        let cycle_line = if cycle.cycle_number == 0 {
            format!("Study cycle starts on {} (from {anchor})", cycle.cycle_start)
        } else {
            format!(
                "Study cycle {}, day {} of 21 ({} to {}, {} days left, from {anchor})",
                cycle.cycle_number,
                cycle.day_in_cycle,
                cycle.cycle_start,
                cycle.cycle_end,
                cycle.days_left
            )
        };

        format!("{exam_line}\n{cycle_line}")
    }
}

pub fn run(args: &CountdownArgs, calendar: &StudyCalendar) -> Result<CalendarSnapshot> {
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());
    let anchors = CycleAnchors {
        cycle_start_override: args.cycle_start,
        first_session: args.first_session,
        account_created: args.account_created,
    };
    Ok(calendar.snapshot(args.exam.as_deref(), &anchors, today)?)
}

pub async fn execute(args: CountdownArgs, config: &Config, json_mode: bool) -> Result<()> {
    let calendar = StudyCalendar::new(&config.exams);
    output(&run(&args, &calendar)?, json_mode);
    Ok(())
}
