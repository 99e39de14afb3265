use super::*;
use chrono::{TimeZone, Timelike};

fn job() -> JobDefinition {
    JobDefinition::new("job-1", "Hourly", "API-Trigger-Group", "0 0 * * * ?")
}

#[test]
fn test_cron_trigger_for_job() {
    let trigger = CronTrigger::for_job(&job()).unwrap();
    assert_eq!(trigger.key().name, "job-1");
    assert_eq!(trigger.job_key().group, "API-Trigger-Group");
    assert_eq!(trigger.expression(), "0 0 * * * ?");
    assert_eq!(trigger.misfire_policy(), MisfirePolicy::FireAndProceed);
}

#[test]
fn test_cron_trigger_next_fire_on_hour_boundary() {
    let trigger = CronTrigger::for_job(&job()).unwrap();
    let now = Utc.with_ymd_and_hms(2024, 3, 10, 14, 25, 7).unwrap();
    let next = trigger.next_fire_after(now).unwrap();
    assert_eq!(next, Utc.with_ymd_and_hms(2024, 3, 10, 15, 0, 0).unwrap());
    assert_eq!(next.minute(), 0);
    assert_eq!(next.second(), 0);
}

#[test]
fn test_cron_trigger_invalid_expression() {
    let result = CronTrigger::for_job_with(&job(), "not a cron");
    match result {
        Err(EngineError::InvalidCron { expression, .. }) => assert_eq!(expression, "not a cron"),
        other => panic!("expected InvalidCron, got {:?}", other),
    }
}

#[test]
fn test_cron_trigger_misfire_policy_override() {
    let trigger = CronTrigger::for_job(&job())
        .unwrap()
        .with_misfire_policy(MisfirePolicy::DoNothing);
    assert_eq!(trigger.misfire_policy(), MisfirePolicy::DoNothing);
}

#[test]
fn test_job_detail_for_job() {
    let detail = JobDetail::for_job(&job());
    assert_eq!(detail.key, JobKey::new("job-1", "API-Trigger-Group"));
    assert_eq!(detail.definition.job_id, "job-1");
}

#[test]
fn test_firing_context_defaults() {
    let def = job();
    let ctx = FiringContext::new(def.job_key(), def, Utc::now());
    assert_eq!(ctx.refire_index, 0);
    assert!(ctx.execute_time.is_none());
    assert!(ctx.scheduled_fire_time.is_none());
    assert!(!ctx.is_cancelled());
}

#[test]
fn test_firing_context_cancellation() {
    let def = job();
    let ctx = FiringContext::new(def.job_key(), def, Utc::now()).with_refire_index(2);
    let token = ctx.cancellation_token().clone();
    token.cancel();
    assert!(ctx.is_cancelled());
    assert_eq!(ctx.refire_index, 2);
}

struct PlainJob;

#[async_trait]
impl ScheduledJob for PlainJob {
    async fn execute(&self, _ctx: &mut FiringContext) -> Result<(), JobError> {
        Ok(())
    }
}

#[tokio::test]
async fn test_scheduled_job_default_interrupt_is_refused() {
    let plain = PlainJob;
    let def = job();
    let mut ctx = FiringContext::new(def.job_key(), def, Utc::now());
    assert!(plain.execute(&mut ctx).await.is_ok());
    assert!(matches!(plain.interrupt(), Err(JobError::NotInterruptible(_))));
}
