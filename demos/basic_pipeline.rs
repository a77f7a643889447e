//! Basic Pipeline
//!
//! Build a corpus from words, slice it into overlapping windows, and keep
//! the windows that mention a query.
//!
//! ```bash
//! cargo run --example basic_pipeline
//! ```

use tessera::{
    Attr, Chunks, Corpus, FixedSizeChunk, Membership, RegexCount, RegexFlags, SimpleStringify,
    Table, Threshold, Value,
};

fn main() -> tessera::Result<()> {
    let document = "Machine learning models learn patterns from data. \
        They generalize these patterns to make predictions. \
        This is fundamentally different from traditional programming. \
        Deep learning extends this with multiple hidden layers. \
        Each layer learns increasingly abstract representations.";

    // One atom per whitespace-separated word, in reading order.
    let words: Vec<&str> = document.split_whitespace().collect();
    let atoms = Table::from_columns([
        ("id", (0..words.len() as i64).map(Value::Int).collect()),
        ("ordinal", (0..words.len() as i64).map(Value::Int).collect()),
        ("text", words.iter().map(|w| Value::from(*w)).collect()),
    ])?;
    let corpus = Corpus::new(atoms)?;

    let doc = Chunks::new(
        &corpus,
        Table::from_columns([("id", vec![Value::from("intro")])])?,
        (0..words.len() as i64)
            .map(|i| Membership::new("intro", i))
            .collect(),
    )?;
    corpus.set_chunk("document", doc)?;

    // Windows of 10 words, overlapping by 3.
    let windows = corpus.chunk(FixedSizeChunk::new("document", 10)?.with_offset(-3)?)?;
    println!("Document: {} words", corpus.len());
    println!("Windows: {}\n", windows.len());

    let mentions = RegexCount::new(SimpleStringify::default(), "learn", RegexFlags::CASE_INSENSITIVE)?;
    let hits = windows
        .enrich(&[("mentions", &mentions)])?
        .filter(&[&Threshold::new("mentions", ">", 0)?])?
        .select(&["mentions"], &[("text", Attr::Expr(&SimpleStringify::default()))])?;

    let counts = hits.column("mentions").unwrap_or_default();
    let texts = hits.column("text").unwrap_or_default();
    for (i, (count, text)) in counts.iter().zip(texts).enumerate() {
        println!("[{i}] {count} mention(s): {text}");
    }

    Ok(())
}
