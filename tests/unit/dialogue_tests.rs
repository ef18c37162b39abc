/*!
 * Tests for script loading and dialogue acquisition
 */

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;

use dialogsync::dialogue::acquirer::load_script;
use dialogsync::dialogue::extract::{locate_payload, PayloadStrategy};
use dialogsync::dialogue::{DialogueAcquirer, DialogueEntry, DialogueSource, NoDelay, RetryPolicy};
use dialogsync::errors::PipelineError;
use dialogsync::providers::mock::{MockGenerator, MockReply};
use crate::common;

const VALID_PAYLOAD: &str = r#"{"transcript": [{"agentId": "JOE_ROGAN", "text": "Hey man"}, {"agentId": "BARACK_OBAMA", "text": "Let me be clear"}]}"#;

/// Test that a well-formed script loads in order
#[test]
fn test_load_script_withValidEntries_shouldKeepOrder() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let script = common::create_script(temp_dir.path(), "transcript.json", &[
        ("JOE_ROGAN", "first"),
        ("BARACK_OBAMA", "  second  "),
        ("JOE_ROGAN", "third"),
    ])?;

    let entries = load_script(&script)?;
    let speakers: Vec<&str> = entries.iter().map(|e| e.speaker_id.as_str()).collect();
    assert_eq!(speakers, vec!["JOE_ROGAN", "BARACK_OBAMA", "JOE_ROGAN"]);
    assert_eq!(entries[1].text, "second");
    Ok(())
}

/// Test that any single invalid entry rejects the whole script
#[test]
fn test_load_script_withOneInvalidEntry_shouldRejectEverything() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let invalid_speakers = ["joe_rogan", "JOE__ROGAN", "JOE ROGAN", "_A", "A1", ""];

    for (i, bad) in invalid_speakers.iter().enumerate() {
        let script = common::create_script(temp_dir.path(), &format!("bad-{}.json", i), &[
            ("A", "ok"),
            (bad, "looks fine"),
            ("B", "ok too"),
        ])?;
        let err = load_script(&script).unwrap_err();
        assert!(matches!(err, PipelineError::Validation(_)), "speaker {:?} should be rejected", bad);
    }

    let script = common::create_script(temp_dir.path(), "blank.json", &[("A", "ok"), ("B", " \t ")])?;
    assert!(matches!(load_script(&script), Err(PipelineError::Validation(_))));
    Ok(())
}

/// Test that malformed JSON is a validation error
#[test]
fn test_load_script_withMalformedJson_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let script = common::create_test_file(temp_dir.path(), "broken.json", "[{\"agentId\": \"A\"")?;
    assert!(matches!(load_script(&script), Err(PipelineError::Validation(_))));
    assert!(matches!(
        load_script(&temp_dir.path().join("missing.json")),
        Err(PipelineError::Validation(_))
    ));
    Ok(())
}

/// Test that an always-failing service is tried exactly five times
#[tokio::test]
async fn test_generate_withAlwaysFailingService_shouldStopAfterFiveAttempts() {
    let generator = Arc::new(MockGenerator::failing());
    let delay = Arc::new(NoDelay::default());
    let acquirer = DialogueAcquirer::new(generator.clone(), delay.clone(), RetryPolicy::default());

    let err = acquirer
        .acquire(&DialogueSource::Topic("interest rates".to_string()), "JOE_ROGAN", "BARACK_OBAMA")
        .await
        .unwrap_err();

    assert_eq!(generator.call_count(), 5);
    assert_eq!(delay.wait_count(), 4);
    match err {
        PipelineError::AcquisitionFailed { topic, attempts, .. } => {
            assert_eq!(topic, "interest rates");
            assert_eq!(attempts, 5);
        }
        other => panic!("expected AcquisitionFailed, got {:?}", other),
    }
}

/// Test that every kind of bad response counts as a failed attempt
#[tokio::test]
async fn test_generate_withMixedBadResponses_shouldSucceedOnFifthAttempt() {
    let generator = Arc::new(MockGenerator::scripted(vec![
        MockReply::Error("503".to_string()),
        MockReply::Text("no payload at all".to_string()),
        MockReply::Text("```json\n{\"transcript\": [\n```".to_string()),
        MockReply::Text("{\"transcript\": \"A: hi\"}".to_string()),
        MockReply::Text(format!("Sure! Here it is:\n```json\n{}\n```\nEnjoy.", VALID_PAYLOAD)),
    ]));
    let delay = Arc::new(NoDelay::default());
    let acquirer = DialogueAcquirer::new(generator.clone(), delay.clone(), RetryPolicy::default());

    let entries = acquirer.generate("podcasts", "JOE_ROGAN", "BARACK_OBAMA").await.unwrap();

    assert_eq!(generator.call_count(), 5);
    assert_eq!(delay.wait_count(), 4);
    assert_eq!(entries, vec![
        DialogueEntry::new("JOE_ROGAN", "Hey man").unwrap(),
        DialogueEntry::new("BARACK_OBAMA", "Let me be clear").unwrap(),
    ]);
}

/// Test that the policy bound and delay come from configuration
#[tokio::test]
async fn test_generate_withCustomPolicy_shouldHonorAttemptBudget() {
    let generator = Arc::new(MockGenerator::failing());
    let delay = Arc::new(NoDelay::default());
    let policy = RetryPolicy { max_attempts: 2, delay: Duration::from_secs(1) };
    let acquirer = DialogueAcquirer::new(generator.clone(), delay.clone(), policy);

    assert!(acquirer.generate("x", "A", "B").await.is_err());
    assert_eq!(generator.call_count(), 2);
    assert_eq!(delay.wait_count(), 1);
}

/// Test that the prompt names both speakers and the topic
#[tokio::test]
async fn test_generate_withTopic_shouldSendStructuredPrompt() {
    let generator = Arc::new(MockGenerator::always(VALID_PAYLOAD));
    let acquirer = DialogueAcquirer::new(generator.clone(), Arc::new(NoDelay::default()), RetryPolicy::default())
        .with_max_exchanges(4);

    acquirer.generate("space travel", "JOE_ROGAN", "BARACK_OBAMA").await.unwrap();

    let prompts = generator.prompts();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].system.contains("space travel"));
    assert!(prompts[0].system.contains("JOE ROGAN"));
    assert!(prompts[0].system.contains("maximum of 4 exchanges"));
    assert!(prompts[0].json_output);
}

/// Test the payload strategies are tried in order
#[test]
fn test_locate_payload_withEachShape_shouldReportStrategy() {
    let tagged = format!("```json\n{}\n```", VALID_PAYLOAD);
    let generic = format!("```\n{}\n```", VALID_PAYLOAD);
    let bare = format!("Here you go: {} Hope that helps!", VALID_PAYLOAD);

    assert_eq!(locate_payload(&tagged).map(|(s, _)| s), Some(PayloadStrategy::TaggedFence));
    assert_eq!(locate_payload(&generic).map(|(s, _)| s), Some(PayloadStrategy::GenericFence));
    assert_eq!(locate_payload(&bare), Some((PayloadStrategy::BraceSpan, VALID_PAYLOAD.to_string())));
    assert_eq!(locate_payload("nothing structured here"), None);
}
