use application::query_service::QueryService;
use domain::models::ScoredQuestion;
use presentation::repl::{run_demo, run_query_loop, DEMO_QUESTIONS, GOODBYE, UNREADABLE_INPUT};
use std::io::Cursor;
use tests::{hit, FakeSearch};

async fn run(service: &QueryService<FakeSearch>, input: &str) -> String {
    colored::control::set_override(false);
    let mut out = Vec::new();
    run_query_loop(service, &mut Cursor::new(input.to_string()), &mut out)
        .await
        .unwrap();
    String::from_utf8(out).unwrap()
}

fn sample_hits() -> Vec<ScoredQuestion> {
    vec![
        hit("11", 0.71, "What is the best way to learn Rust?"),
        hit("12", 0.93, "How do I learn Rust?"),
        hit("13", 0.55, "Is Rust hard to learn?"),
    ]
}

#[tokio::test]
async fn exit_sentinel_stops_without_searching() {
    for sentinel in ["quit", "QUIT", "  Quit  ", "exit", "q"] {
        let service = QueryService::new(FakeSearch::returning(sample_hits()), 5);
        let output = run(&service, &format!("{sentinel}\nhow do I learn rust\n")).await;
        assert_eq!(service.searcher().calls(), 0, "sentinel {sentinel:?}");
        assert!(output.contains(GOODBYE));
    }
}

#[tokio::test]
async fn end_of_input_stops_the_loop() {
    let service = QueryService::new(FakeSearch::returning(sample_hits()), 5);
    let output = run(&service, "").await;
    assert_eq!(service.searcher().calls(), 0);
    assert!(output.contains(GOODBYE));
}

#[tokio::test]
async fn empty_lines_are_ignored() {
    let service = QueryService::new(FakeSearch::returning(sample_hits()), 5);
    let output = run(&service, "\n   \n\nquit\n").await;
    assert_eq!(service.searcher().calls(), 0);
    assert_eq!(output.matches("Your question: ").count(), 4);
    assert!(!output.contains("Searching..."));
}

#[tokio::test]
async fn invalid_utf8_line_is_reported_and_loop_continues() {
    colored::control::set_override(false);
    let service = QueryService::new(FakeSearch::returning(sample_hits()), 5);
    let mut out = Vec::new();
    let input = b"\xff\xfe bad\nhow to learn rust\nquit\n".to_vec();
    run_query_loop(&service, &mut Cursor::new(input), &mut out)
        .await
        .unwrap();
    let output = String::from_utf8(out).unwrap();

    assert_eq!(service.searcher().questions(), vec!["how to learn rust".to_string()]);
    assert!(output.contains(UNREADABLE_INPUT));
    assert!(output.contains("Found 3 similar questions:"));
    assert!(output.contains(GOODBYE));
}

#[tokio::test]
async fn service_error_is_reported_and_loop_continues() {
    let searcher = FakeSearch::returning(sample_hits()).then_fail("connection reset by peer");
    let service = QueryService::new(searcher, 5);
    let output = run(&service, "first question\nsecond question\nquit\n").await;

    assert_eq!(
        service.searcher().questions(),
        vec!["first question".to_string(), "second question".to_string()]
    );
    assert!(output.contains("Error searching: connection reset by peer"));
    assert!(output.contains("Please try again."));
    assert!(output.contains("Question: 'second question'"));
    assert!(output.contains(GOODBYE));
}

#[tokio::test]
async fn results_render_in_descending_order_with_four_decimals() {
    let service = QueryService::new(FakeSearch::returning(sample_hits()), 5);
    let output = run(&service, "learn rust\nquit\n").await;

    assert!(output.contains("Found 3 similar questions:"));
    let first = output.find("1. Score: 0.9300").expect("rank 1");
    let second = output.find("2. Score: 0.7100").expect("rank 2");
    let third = output.find("3. Score: 0.5500").expect("rank 3");
    assert!(first < second && second < third);
    assert!(output.contains("1. Score: 0.9300\n   Question: How do I learn Rust?"));
    assert!(!output.contains("4. Score:"));
}

#[tokio::test]
async fn fewer_hits_than_requested_renders_only_those() {
    let service = QueryService::new(FakeSearch::returning(sample_hits()), 2);
    let output = run(&service, "learn rust\nquit\n").await;
    assert!(output.contains("Found 2 similar questions:"));
    assert_eq!(output.matches(". Score: ").count(), 2);
}

#[tokio::test]
async fn no_hits_prints_placeholder() {
    let service = QueryService::new(FakeSearch::returning(Vec::new()), 5);
    let output = run(&service, "something obscure\nquit\n").await;
    assert!(output.contains("No similar questions found."));
}

#[tokio::test]
async fn repeated_query_renders_identically() {
    let service = QueryService::new(FakeSearch::returning(sample_hits()), 5);
    let output = run(&service, "learn rust\nlearn rust\nquit\n").await;

    let blocks: Vec<&str> = output
        .split("Searching...")
        .skip(1)
        .map(|block| block.split("Your question: ").next().unwrap_or_default())
        .collect();
    assert_eq!(blocks.len(), 2);
    assert_eq!(blocks[0], blocks[1]);
}

#[tokio::test]
async fn demo_runs_every_sample_question() {
    colored::control::set_override(false);
    let searcher = FakeSearch::returning(sample_hits()).then_fail("quota exceeded");
    let service = QueryService::new(searcher, 5);
    let mut out = Vec::new();
    run_demo(&service, &DEMO_QUESTIONS, &mut out).await.unwrap();
    let output = String::from_utf8(out).unwrap();

    assert_eq!(service.searcher().calls(), DEMO_QUESTIONS.len());
    assert!(output.contains("Demo 1/5"));
    assert!(output.contains("Demo 5/5"));
    assert!(output.contains("Error searching: quota exceeded"));
    assert!(output.contains("Question: 'How do I invest in stocks?'"));
}
