use analysis::{Engine, EngineConfig, IngestError};
use common::chat::{ChatChannel, ChatMessage, TeamSide};
use common::scoreboard::ScoreboardSnapshot;
use common::SubmitSummary;
use pretty_assertions::assert_eq;
use tracing_test::traced_test;

fn chat_line(name: &str, account: u32, team: &str, command: &str, message: &str) -> String {
    format!(
        r#"00:01:02.345 - "{}<1><[U:1:{}]><{}>" {} "{}""#,
        name, account, team, command, message
    )
}

#[test]
#[traced_test]
fn single_chat_message() {
    let mut engine = Engine::default();

    let summary = engine
        .submit(&[r#"00:01:02.345 - "Alice<1><[U:1:111]><CT>" say "gg""#])
        .unwrap();

    assert_eq!(
        SubmitSummary {
            lines_processed: 1,
            chat_messages_added: 1,
        },
        summary
    );
    assert_eq!(
        vec![ChatMessage {
            timestamp: "00:01:02.345".to_owned(),
            sender: "Alice".to_owned(),
            msg: "gg".to_owned(),
            team: TeamSide::CT,
        }],
        engine.display_chat()
    );
    assert_eq!(Some("Alice"), engine.nickname_table().get("111"));
}

#[test]
#[traced_test]
fn two_call_block() {
    let mut engine = Engine::default();

    engine
        .submit(&["...JSON_BEGIN{\"fields\":\"nickname,team\","])
        .unwrap();
    assert!(engine.is_capturing_block());
    assert_eq!(ScoreboardSnapshot::default(), *engine.scoreboard());

    engine
        .submit(&["\"players\":{\"1\":\"A,3\",}}JSON_END"])
        .unwrap();

    let expected = ScoreboardSnapshot {
        fields: vec!["nickname".to_owned(), "team".to_owned()],
        players: vec![[("nickname", "A"), ("team", "3")].into_iter().collect()],
    };
    assert_eq!(expected, *engine.scoreboard());
    assert!(!engine.is_capturing_block());

    let json = serde_json::to_string(&*engine.scoreboard()).unwrap();
    assert_eq!(
        r#"{"fields":["nickname","team"],"players":[{"nickname":"A","team":"3"}]}"#,
        json
    );
}

const BLOCK: [&str; 8] = [
    "L 10/16/2024 - 11:59:58: \"Alice<1><[U:1:111]><CT>\" entered the game",
    "L 10/16/2024 - 12:00:00: JSON_BEGIN{",
    "L 10/16/2024 - 12:00:00: \"name\": \"round_stats\",",
    "L 10/16/2024 - 12:00:00: \"fields\" : \"accountid, team, kills, deaths\",",
    "L 10/16/2024 - 12:00:00: \"players\" : {",
    "L 10/16/2024 - 12:00:00: \"player_0\" : \"111, 3, 4, 1\",",
    "L 10/16/2024 - 12:00:00: \"player_1\" : \"222, 2, 1, 4\",",
    "L 10/16/2024 - 12:00:00: }}JSON_END",
];

#[test]
fn block_split_over_calls_matches_single_call() {
    let mut whole = Engine::default();
    whole.submit(&BLOCK).unwrap();

    let mut split = Engine::default();
    for line in BLOCK {
        split.submit(&[line]).unwrap();
    }

    assert_eq!(whole.scoreboard(), split.scoreboard());
    assert_eq!(2, whole.scoreboard().players.len());
    assert_eq!(
        Some("Alice"),
        whole.scoreboard().players[0].get("nickname")
    );
    assert_eq!(Some("ID:222"), whole.scoreboard().players[1].get("nickname"));
}

#[test]
fn block_lines_are_not_chat() {
    let mut engine = Engine::default();

    let summary = engine.submit(&BLOCK).unwrap();

    assert_eq!(8, summary.lines_processed);
    assert_eq!(0, summary.chat_messages_added);
    assert!(engine.detected_chat().is_empty());
    assert_eq!(8, engine.raw_lines().len());
}

#[test]
fn chat_inside_open_block_is_consumed() {
    let mut engine = Engine::default();
    let chat = chat_line("Alice", 111, "CT", "say", "hello");

    let summary = engine.submit(&["JSON_BEGIN{", chat.as_str()]).unwrap();

    assert_eq!(0, summary.chat_messages_added);
    assert!(engine.display_chat().is_empty());
    assert!(engine.detected_chat().is_empty());
    assert!(engine.is_capturing_block());
    // Identity tags are still picked up inside a block
    assert_eq!(Some("Alice"), engine.nickname_table().get("111"));
}

#[test]
fn chat_body_cannot_open_a_block() {
    let mut engine = Engine::default();
    let mut lines = vec![chat_line("Mallory", 666, "T", "say", "JSON_BEGIN{ lol")];
    lines.extend((0..1000).map(|idx| chat_line("Alice", 111, "CT", "say", &idx.to_string())));

    let summary = engine.submit(&lines).unwrap();

    assert!(!engine.is_capturing_block());
    assert_eq!(1001, summary.chat_messages_added);
    assert_eq!("999", engine.display_chat().last().unwrap().msg);
    assert_eq!(200, engine.detected_chat().len());
}

#[test]
#[traced_test]
fn runaway_block_is_dropped() {
    let mut engine = Engine::new(EngineConfig {
        max_block_lines: 5,
        ..Default::default()
    });
    let mut lines = vec!["JSON_BEGIN{".to_owned()];
    lines.extend((0..10).map(|idx| chat_line("Alice", 111, "CT", "say", &idx.to_string())));

    let summary = engine.submit(&lines).unwrap();

    assert!(!engine.is_capturing_block());
    assert_eq!(6, summary.chat_messages_added);
    let messages: Vec<_> = engine.display_chat().into_iter().map(|m| m.msg).collect();
    assert_eq!(vec!["4", "5", "6", "7", "8", "9"], messages);
    assert!(logs_contain("Block did not end in time"));
}

#[test]
fn block_ending_where_the_next_begins() {
    let mut engine = Engine::default();

    engine
        .submit(&[
            "JSON_BEGIN{\"fields\":\"name,kills\",",
            "\"players\":{\"a\":\"A,1\"}}JSON_END JSON_BEGIN{\"fields\":\"x\",",
        ])
        .unwrap();

    assert_eq!(1, engine.scoreboard().players.len());
    assert_eq!(1, engine.raw_scoreboard_inputs().len());
    assert!(engine.is_capturing_block());
}

#[test]
fn team_chat_is_detected_but_not_displayed() {
    let mut engine = Engine::default();

    let summary = engine
        .submit(&[
            chat_line("Alice", 111, "CT", "say_team", "rotate"),
            chat_line("Bob", 222, "TERRORIST", "say", "<script>"),
        ])
        .unwrap();

    assert_eq!(1, summary.chat_messages_added);

    let detected = engine.detected_chat();
    assert_eq!(2, detected.len());
    assert_eq!(ChatChannel::Team, detected[0].channel);
    assert_eq!("<script>", detected[1].message);

    let display = engine.display_chat();
    assert_eq!(1, display.len());
    assert_eq!("&lt;script&gt;", display[0].msg);
    assert_eq!(TeamSide::T, display[0].team);
}

#[test]
#[traced_test]
fn reset_command_clears_display_chat() {
    let mut engine = Engine::default();
    let lines: Vec<_> = (0..20)
        .map(|idx| chat_line("Alice", 111, "CT", "say", &format!("message {}", idx)))
        .collect();
    engine.submit(&lines).unwrap();
    assert_eq!(20, engine.display_chat().len());

    let summary = engine
        .submit(&[chat_line("Admin", 999, "Spectator", "say_team", "!RESETCHAT new round")])
        .unwrap();

    assert_eq!(1, summary.chat_messages_added);
    assert_eq!(
        vec![ChatMessage {
            timestamp: "00:01:02.345".to_owned(),
            sender: "SYSTEM".to_owned(),
            msg: "Chat cleared by Admin: new round".to_owned(),
            team: TeamSide::Other,
        }],
        engine.display_chat()
    );
    // The command itself is still part of the detected chat
    assert_eq!(21, engine.detected_chat().len());
}

#[test]
fn reset_command_without_parameters() {
    let mut engine = Engine::default();

    engine
        .submit(&[chat_line("Admin", 999, "CT", "say", "!resetchat")])
        .unwrap();

    assert_eq!("Chat cleared by Admin", engine.display_chat()[0].msg);
}

#[test]
fn custom_reset_command() {
    let mut engine = Engine::new(EngineConfig {
        reset_command: "!clear".to_owned(),
        ..Default::default()
    });

    engine
        .submit(&[
            chat_line("Alice", 111, "CT", "say", "!resetchat"),
            chat_line("Alice", 111, "CT", "say", "!clear"),
        ])
        .unwrap();

    let display = engine.display_chat();
    assert_eq!(1, display.len());
    assert_eq!("SYSTEM", display[0].sender);
}

#[test]
fn histories_are_bounded() {
    let mut engine = Engine::new(EngineConfig {
        chat_history: 3,
        raw_line_history: 4,
        ..Default::default()
    });
    let lines: Vec<_> = (0..10)
        .map(|idx| chat_line("Alice", 111, "CT", "say", &idx.to_string()))
        .collect();

    engine.submit(&lines).unwrap();

    let messages: Vec<_> = engine.display_chat().into_iter().map(|m| m.msg).collect();
    assert_eq!(vec!["7", "8", "9"], messages);
    assert_eq!(lines[6..].to_vec(), engine.raw_lines());
}

#[test]
fn empty_batch_is_an_error() {
    let mut engine = Engine::default();

    let empty: [&str; 0] = [];
    assert_eq!(Err(IngestError::EmptyBatch), engine.submit(&empty));
    assert_eq!(Err(IngestError::EmptyBatch), engine.submit(&["", "   ", "\t"]));
    assert!(engine.raw_lines().is_empty());
}

#[test]
fn broken_block_does_not_stop_the_batch() {
    let mut engine = Engine::default();
    engine
        .submit(&["JSON_BEGIN{\"fields\":\"name,kills\",\"players\":{\"a\":\"A,1\"}}JSON_END"])
        .unwrap();
    let before = engine.scoreboard();

    let chat = chat_line("Alice", 111, "CT", "say", "still here");
    let summary = engine
        .submit(&["JSON_BEGIN{\"fields\": [oops", "}}JSON_END", chat.as_str()])
        .unwrap();

    assert_eq!(3, summary.lines_processed);
    assert_eq!(1, summary.chat_messages_added);
    assert_eq!(before, engine.scoreboard());
    assert_eq!(2, engine.raw_scoreboard_inputs().len());
}

#[test]
fn nickname_dump_is_sorted() {
    let mut engine = Engine::default();

    engine
        .submit(&[
            r#"00:00:01.000 - "Zed<3><[U:1:300]><CT>" connected, address """#,
            r#"00:00:02.000 - "Amy<4><[U:1:100]><TERRORIST>" entered the game"#,
        ])
        .unwrap();

    let dump: Vec<_> = engine.nicknames().into_iter().collect();
    assert_eq!(
        vec![
            ("100".to_owned(), "Amy".to_owned()),
            ("300".to_owned(), "Zed".to_owned()),
        ],
        dump
    );
}
