//! Maps a requested operation plus an instance's environment class and region
//! to the literal shell command sent through Run Command.
//!
//! Scheduled windows are configured in the instance's regional time and
//! converted to a UTC `systemd-run --on-calendar` expression.

use chrono::{DateTime, Datelike, Days, NaiveTime, TimeZone, Utc, Weekday};
use chrono_tz::Tz;

use crate::error::{Error, Result};
use crate::models::{InstanceRecord, ScheduleConfig};

pub const PATCH_BASE_COMMAND: &str = "sudo yum update-minimal --security -y || sudo dnf update --security --bugfix --enhancement=important --enhancement=moderate --enhancement=low -y";
pub const UPGRADE_BASE_COMMAND: &str = "sudo yum update -y || sudo dnf update -y";
pub const RESTART_COMMAND: &str = "sudo shutdown -r +1";
const PATCH_LOG: &str = "/var/log/patching.log";
const MAX_JITTER_SECS: u32 = 1800;

/// Operation requested from the listing page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CommandType {
    Patch,
    Upgrade,
    Restart,
    Custom(String),
}

impl CommandType {
    /// Parses the form's `command_type`; `custom` requires non-empty text.
    pub fn parse(kind: &str, custom_command: &str) -> Option<Self> {
        match kind.trim() {
            "patching" | "patch" => Some(CommandType::Patch),
            "upgrade" => Some(CommandType::Upgrade),
            "restart" => Some(CommandType::Restart),
            "custom" if !custom_command.trim().is_empty() => {
                Some(CommandType::Custom(custom_command.to_string()))
            }
            _ => None,
        }
    }
}

/// The command string plus the label shown to operators and sent as the
/// Run Command comment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuiltCommand {
    pub command: String,
    pub label: String,
}

/// When a maintenance command runs for an environment class.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Window {
    /// Scheduled at the dev/staging slot, reboots afterwards.
    StgDev,
    /// Scheduled at the production slot, no reboot.
    Prod,
    Immediate,
}

impl Window {
    pub fn for_environment(environment_class: &str) -> Self {
        match environment_class.trim().to_ascii_lowercase().as_str() {
            "dev" | "stg" => Window::StgDev,
            "prod" => Window::Prod,
            _ => Window::Immediate,
        }
    }
}

struct Maintenance {
    base: &'static str,
    name: &'static str,
    unit_prefix: &'static str,
    banner: &'static str,
    verb: &'static str,
    activity: &'static str,
}

const PATCH: Maintenance = Maintenance {
    base: PATCH_BASE_COMMAND,
    name: "Security Patching",
    unit_prefix: "security-update",
    banner: "SECURITY UPDATE",
    verb: "update",
    activity: "security update",
};

const UPGRADE: Maintenance = Maintenance {
    base: UPGRADE_BASE_COMMAND,
    name: "System Upgrade",
    unit_prefix: "upgrade",
    banner: "SYSTEM UPGRADE",
    verb: "upgrade",
    activity: "system upgrade",
};

/// Builds the command for one instance. `now` anchors the "next occurrence"
/// used for the timezone conversion.
pub fn build_command(
    command_type: &CommandType,
    instance: &InstanceRecord,
    schedule: &ScheduleConfig,
    now: DateTime<Utc>,
) -> Result<BuiltCommand> {
    let maintenance = match command_type {
        CommandType::Patch => &PATCH,
        CommandType::Upgrade => &UPGRADE,
        CommandType::Restart => {
            return Ok(BuiltCommand {
                command: RESTART_COMMAND.to_string(),
                label: "Restart".to_string(),
            })
        }
        CommandType::Custom(text) => {
            return Ok(BuiltCommand {
                command: text.clone(),
                label: "Custom Command".to_string(),
            })
        }
    };

    let window = Window::for_environment(&instance.environment_class);
    let (day, time, unit_suffix, reboot) = match window {
        Window::StgDev => (&schedule.stg_dev_day, &schedule.stg_dev_time, "stgdev", true),
        Window::Prod => (&schedule.prod_day, &schedule.prod_time, "prod", false),
        Window::Immediate => {
            return Ok(BuiltCommand {
                command: maintenance.base.to_string(),
                label: maintenance.name.to_string(),
            })
        }
    };

    let tz = region_timezone(&instance.region);
    let calendar = utc_calendar(day, time, tz, now)?;
    let unit = format!("{}-{}", maintenance.unit_prefix, unit_suffix);
    Ok(BuiltCommand {
        command: scheduled_script(maintenance, &calendar, &unit, tz, reboot),
        label: format!(
            "Scheduled {} ({} {} {}{})",
            maintenance.name,
            day,
            time,
            tz.name(),
            if reboot { " with reboot" } else { "" }
        ),
    })
}

fn scheduled_script(m: &Maintenance, calendar: &str, unit: &str, tz: Tz, reboot: bool) -> String {
    let completion = if reboot {
        r#"echo "SCHEDULED-UPDATE completed at $(date), rebooting now" && sudo reboot"#
    } else {
        r#"echo "SCHEDULED-UPDATE completed at $(date)""#
    };
    let steps = [
        format!("export TZ={}", tz.name()),
        format!("exec >> {PATCH_LOG} 2>&1"),
        r#"echo """#.to_string(),
        format!(r#"echo "=== NEW {} RUN: $(date) ===""#, m.banner),
        r#"echo "SCHEDULED-UPDATE starting at $(date)""#.to_string(),
        format!("SLEEP_TIME=$((RANDOM % {MAX_JITTER_SECS}))"),
        format!(
            r#"echo "Will sleep for $SLEEP_TIME seconds and {} at $(date -d "+$SLEEP_TIME seconds")""#,
            m.verb
        ),
        "sleep $SLEEP_TIME".to_string(),
        format!(r#"echo "Starting {} at $(date)""#, m.activity),
        format!("{} && {}", m.base, completion),
    ];
    format!(
        r#"sudo systemd-run --on-calendar="{calendar}" --unit={unit} /bin/bash -c '{}'"#,
        steps.join("; ")
    )
}

/// IANA zone used for an AWS region's maintenance window; UTC when unknown.
pub fn region_timezone(region: &str) -> Tz {
    match region.trim() {
        "eu-west-2" => Tz::Europe__London,
        "eu-west-1" => Tz::Europe__Dublin,
        "eu-central-1" => Tz::Europe__Berlin,
        "eu-west-3" => Tz::Europe__Paris,
        "eu-north-1" => Tz::Europe__Stockholm,
        "ap-southeast-1" => Tz::Asia__Singapore,
        "ap-east-1" => Tz::Asia__Hong_Kong,
        "me-central-1" => Tz::Asia__Dubai,
        "ap-northeast-1" => Tz::Asia__Tokyo,
        "us-east-1" | "us-east-2" => Tz::America__New_York,
        "us-west-1" | "us-west-2" => Tz::America__Los_Angeles,
        _ => Tz::UTC,
    }
}

pub fn parse_weekday(day: &str) -> Result<Weekday> {
    day.trim()
        .parse::<Weekday>()
        .map_err(|_| Error::Schedule(format!("invalid day: {day}")))
}

pub fn parse_time(time: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(time.trim(), "%H:%M")
        .map_err(|_| Error::Schedule(format!("invalid time format: {time}")))
}

/// Converts a regional (weekday, HH:MM) into the UTC `"<Ddd> <HH:MM>"`
/// calendar expression, using the next occurrence of that weekday on or after
/// `now` in `tz`.
pub fn utc_calendar(day: &str, time: &str, tz: Tz, now: DateTime<Utc>) -> Result<String> {
    let weekday = parse_weekday(day)?;
    let at = parse_time(time)?;

    let today = now.with_timezone(&tz).date_naive();
    let ahead = (weekday.num_days_from_monday() + 7 - today.weekday().num_days_from_monday()) % 7;
    let date = today
        .checked_add_days(Days::new(u64::from(ahead)))
        .ok_or_else(|| Error::Schedule(format!("date overflow for {day}")))?;
    let naive = date.and_time(at);

    // A wall time inside a DST gap does not exist; use the hour after it.
    let local = tz
        .from_local_datetime(&naive)
        .earliest()
        .or_else(|| tz.from_local_datetime(&(naive + chrono::Duration::hours(1))).earliest())
        .ok_or_else(|| Error::Schedule(format!("{day} {time} does not exist in {}", tz.name())))?;

    let utc = local.with_timezone(&Utc);
    Ok(utc.format("%a %H:%M").to_string())
}
