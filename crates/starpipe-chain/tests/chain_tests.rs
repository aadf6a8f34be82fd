use pretty_assertions::assert_eq;
use starpipe_chain::{
    parse_str, ChainError, CommandLine, ExitInfo, RunOutput, RunnerError, StoryChain,
};
use starpipe_test_utils::{dynamics_fixture, king_fixture, kira_stream, ScriptedRunner};

fn cmd(s: &str) -> CommandLine {
    s.parse().unwrap()
}

/// Opt-in log output for debugging: `RUST_LOG=starpipe_chain=debug`.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[tokio::test]
async fn single_command_yields_one_parsed_snapshot() {
    init_tracing();
    let runner = ScriptedRunner::new().respond("makeking", king_fixture());
    let chain = StoryChain::with_runner(runner);

    let snaps = chain
        .from_single_command(&cmd("makeking -w 1.5 -s 1454677882 -n 5 -i"))
        .await
        .unwrap();

    let story = snaps.single().expect("one snapshot");
    assert_eq!(story.tag(), "Particle");
    assert_eq!(story.serialize(), king_fixture());

    let invocations = chain.runner().invocations();
    assert_eq!(invocations.len(), 1);
    assert_eq!(invocations[0].argv[0], "makeking");
    assert_eq!(invocations[0].argv.len(), 8);
    assert!(invocations[0].stdin.is_none());
}

#[tokio::test]
async fn dynamics_scenario_through_the_chain() {
    let runner = ScriptedRunner::new().respond("maketool", dynamics_fixture());
    let chain = StoryChain::with_runner(runner);

    let snaps = chain.from_single_command(&cmd("maketool")).await.unwrap();
    let story = snaps.single().unwrap();
    assert_eq!(story.tag(), "Dynamics");
    assert_eq!(story.get("N"), Some("5"));
    assert_eq!(story.children().count(), 0);
    assert_eq!(story.serialize(), "(Dynamics\n  N = 5\n)Dynamics\n");
}

#[tokio::test]
async fn apply_command_feeds_exact_serialized_story() {
    let evolved = king_fixture().replace("system_time  =  0", "system_time  =  2");
    let runner = ScriptedRunner::new()
        .respond("makeking", king_fixture())
        .respond("makemass", evolved.clone());
    let chain = StoryChain::with_runner(runner);

    let first = chain.from_single_command(&cmd("makeking -n 2")).await.unwrap();
    let story = first.single().unwrap();
    let second = chain
        .apply_command(story, &cmd("makemass -i -l 0.1 -u 20"))
        .await
        .unwrap();

    assert_eq!(second.serialize(), evolved);

    let invocations = chain.runner().invocations();
    assert_eq!(invocations.len(), 2);
    // The second stage received the first stage's output verbatim.
    assert_eq!(invocations[1].stdin.as_deref(), Some(king_fixture().as_str()));
}

#[tokio::test]
async fn command_list_matches_manual_composition() {
    let evolved = king_fixture().replace("seed = 1454677882", "seed = 99");
    let commands = [cmd("makeking -n 2"), cmd("makemass -l 0.1")];

    let listed = {
        let runner = ScriptedRunner::new()
            .respond("makeking", king_fixture())
            .respond("makemass", evolved.clone());
        StoryChain::with_runner(runner)
            .from_command_list(&commands)
            .await
            .unwrap()
    };

    let manual = {
        let runner = ScriptedRunner::new()
            .respond("makeking", king_fixture())
            .respond("makemass", evolved.clone());
        let chain = StoryChain::with_runner(runner);
        let first = chain.from_single_command(&commands[0]).await.unwrap();
        let story = first.single().unwrap().clone();
        chain.apply_command(&story, &commands[1]).await.unwrap()
    };

    assert_eq!(listed, manual);
    assert!(listed.structural_eq(&manual));
}

#[tokio::test]
async fn kira_scenario_yields_six_snapshots() {
    let runner = ScriptedRunner::new()
        .respond("makeking", king_fixture())
        .respond("makemass", king_fixture())
        .respond("kira", kira_stream(6));
    let chain = StoryChain::with_runner(runner);

    let commands = [
        cmd("makeking -w 1.5 -s 1454677882 -n 50 -i"),
        cmd("makemass -i -l 0.1 -u 20 -s 1454677882"),
        cmd("kira -t 10 -d 1 -D 2"),
    ];
    let snaps = chain.from_command_list(&commands).await.unwrap();
    assert!(snaps.single().is_none());
    assert_eq!(snaps.len(), 6);

    let times: Vec<Option<&str>> = snaps
        .iter()
        .map(|s| s.children().next().and_then(|d| d.get("system_time")))
        .collect();
    assert_eq!(
        times,
        [Some("0"), Some("2"), Some("4"), Some("6"), Some("8"), Some("10")]
    );
}

#[tokio::test]
async fn multi_snapshot_intermediate_is_rejected_before_spawning() {
    let runner = ScriptedRunner::new()
        .respond("kira", kira_stream(3))
        .respond("makemass", king_fixture());
    let chain = StoryChain::with_runner(runner);

    let commands = [cmd("kira -t 4 -D 2"), cmd("makemass -l 0.1")];
    let err = chain.from_command_list(&commands).await.unwrap_err();
    assert!(matches!(
        err,
        ChainError::AmbiguousContinuation {
            stage: 1,
            snapshots: 3
        }
    ));

    // The rejected stage never ran.
    let invocations = chain.runner().invocations();
    assert_eq!(invocations.len(), 1);
    assert_eq!(invocations[0].argv[0], "kira");
}

#[tokio::test]
async fn failed_command_output_is_never_parsed() {
    // Stdout is garbage, but the exit status is checked first.
    let runner = ScriptedRunner::new().respond_with(
        "kira",
        RunOutput {
            stdout: "(Particle".to_string(),
            stderr: "kira: blew up\n".to_string(),
            status: ExitInfo::failure(1),
        },
    );
    let chain = StoryChain::with_runner(runner);

    let err = chain.from_single_command(&cmd("kira -t 10")).await.unwrap_err();
    match err {
        ChainError::CommandFailed {
            program,
            code,
            stderr,
        } => {
            assert_eq!(program, "kira");
            assert_eq!(code, Some(1));
            assert_eq!(stderr, "kira: blew up\n");
        }
        other => panic!("expected CommandFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn malformed_output_from_successful_command_is_a_parse_error() {
    let runner = ScriptedRunner::new().respond("maketool", "(Particle\n  N = 2\n");
    let chain = StoryChain::with_runner(runner);

    let err = chain.from_single_command(&cmd("maketool")).await.unwrap_err();
    assert!(matches!(err, ChainError::Parse(_)));
}

#[tokio::test]
async fn empty_command_list_is_rejected() {
    let chain = StoryChain::with_runner(ScriptedRunner::new());
    let err = chain.from_command_list(&[]).await.unwrap_err();
    assert!(matches!(err, ChainError::EmptyChain));
}

#[tokio::test]
async fn unscripted_program_surfaces_as_launch_failure() {
    let chain = StoryChain::with_runner(ScriptedRunner::new());
    let err = chain.from_single_command(&cmd("unknown")).await.unwrap_err();
    assert!(matches!(err, ChainError::Runner(RunnerError::Launch { .. })));
}

// Real-process coverage through the default ProcessRunner.

#[cfg(unix)]
mod real_processes {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    #[tokio::test]
    async fn cat_round_trips_a_story() {
        super::init_tracing();
        let snaps = parse_str(&king_fixture()).unwrap();
        let story = snaps.single().unwrap();

        let chain = StoryChain::new();
        let echoed = chain.apply_command(story, &cmd("cat")).await.unwrap();

        assert_eq!(echoed.single().unwrap(), story);
    }

    #[tokio::test]
    async fn on_disk_stream_parses_to_a_sequence() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snaps.out");
        std::fs::write(&path, kira_stream(2)).unwrap();

        let chain = StoryChain::new();
        let command = cmd(&format!("cat {}", path.display()));
        let snaps = chain.from_single_command(&command).await.unwrap();
        assert_eq!(snaps.len(), 2);
        assert_eq!(snaps.serialize(), kira_stream(2));
    }

    #[tokio::test]
    async fn missing_binary_is_a_launch_error() {
        let chain = StoryChain::new();
        let err = chain
            .from_single_command(&cmd("starpipe-no-such-binary"))
            .await
            .unwrap_err();
        assert!(matches!(err, ChainError::Runner(RunnerError::Launch { .. })));
    }

    #[tokio::test]
    async fn overrunning_stage_times_out() {
        let chain = StoryChain::with_timeout(Duration::from_millis(50));
        let err = chain
            .from_single_command(&cmd("sleep 5"))
            .await
            .unwrap_err();
        assert!(matches!(err, ChainError::Runner(RunnerError::Timeout { .. })));
    }
}
