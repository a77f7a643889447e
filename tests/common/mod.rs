//! Shared fixture: a two-page Tesseract TSV-style table, ingested into a corpus.
//!
//! Atoms are OCR words. Every level above words becomes a chunk collection
//! (`page`, `block`, `paragraph`, `line`) plus one `document` chunk.
//! Ordinals are cumulative across the document, so lines are numbered 1..=8
//! and words 1..=18.

#![allow(dead_code)]

use tessera::{content_id, Chunks, Corpus, Membership, Table, Value};

/// Tesseract's tabular output (as CSV) for two near-identical pages.
pub const TESSERACT_CSV: &str = "\
level,page_num,block_num,par_num,line_num,word_num,left,top,width,height,conf,text
1,1,0,0,0,0,0,0,300,400,-1,
2,1,1,0,0,0,20,20,110,90,-1,
3,1,1,1,0,0,20,20,180,30,-1,
4,1,1,1,1,0,20,20,110,10,-1,
5,1,1,1,1,1,20,20,30,10,96.063751,The
5,1,1,1,1,2,60,20,50,10,95.965691,(quick)
4,1,1,1,2,0,20,40,200,10,-1,
5,1,1,1,2,1,20,40,70,10,95.835831,[brown]
5,1,1,1,2,2,100,40,30,10,94.899742,fox
5,1,1,1,2,3,140,40,60,10,96.683357,jumps!
3,1,1,2,0,0,20,80,90,30,-1,
4,1,1,2,1,0,20,80,80,10,-1,
5,1,1,2,1,1,20,80,40,10,96.912064,Over
5,1,1,2,1,2,40,80,30,10,96.887390,the
4,1,1,2,2,0,20,100,100,10,-1,
5,1,1,2,2,1,20,100,60,10,90.893219,<lazy>
5,1,1,2,2,2,90,100,30,10,96.538940,dog
1,2,0,0,0,0,0,0,300,400,-1,
2,2,1,0,0,0,20,20,110,90,-1,
3,2,1,1,0,0,20,20,180,30,-1,
4,2,1,1,1,0,20,20,110,10,-1,
5,2,1,1,1,1,20,20,30,10,96.063751,The
5,2,1,1,1,2,60,20,50,10,95.965691,~groovy
4,2,1,1,2,0,20,40,200,10,-1,
5,2,1,1,2,1,20,40,70,10,95.835831,minute!
5,2,1,1,2,2,100,40,30,10,94.899742,dog
5,2,1,1,2,3,140,40,60,10,96.683357,bounds
3,2,1,2,0,0,20,80,90,30,-1,
4,2,1,2,1,0,20,80,80,10,-1,
5,2,1,2,1,1,20,80,40,10,96.912064,UPON
5,2,1,2,1,2,40,80,30,10,96.887390,the
4,2,1,2,2,0,20,100,100,10,-1,
5,2,1,2,2,1,20,100,60,10,90.893219,sleepy
5,2,1,2,2,2,90,100,30,10,96.538940,fox
";

const LEVELS: [&str; 4] = ["page", "block", "paragraph", "line"];

/// Rows of one structural level: chunk table columns plus membership.
#[derive(Default)]
struct Level {
    ids: Vec<Value>,
    parent: Vec<Value>,
    ordinal: Vec<Value>,
    left: Vec<Value>,
    top: Vec<Value>,
    width: Vec<Value>,
    height: Vec<Value>,
    members: Vec<Membership>,
}

impl Level {
    fn into_chunks<'c>(self, corpus: &'c Corpus, parent: &str) -> Chunks<'c> {
        let table = Table::from_columns([
            ("id", self.ids),
            (parent, self.parent),
            ("ordinal", self.ordinal),
            ("left", self.left),
            ("top", self.top),
            ("width", self.width),
            ("height", self.height),
        ])
        .unwrap();
        Chunks::new(corpus, table, self.members).unwrap()
    }
}

/// Ingest a Tesseract CSV table; every id embeds `document_id`.
pub fn corpus_from_tesseract(csv: &str, document_id: &str) -> Corpus {
    let mut lines = csv.lines();
    let header: Vec<&str> = lines.next().unwrap().split(',').collect();
    let col = |name: &str| header.iter().position(|h| *h == name).unwrap();
    let (level_col, text_col, conf_col) = (col("level"), col("text"), col("conf"));
    let geometry = ["left", "top", "width", "height"].map(|name| col(name));

    let mut levels: [Level; 4] = Default::default();
    // Cumulative counters: page, block, paragraph, line, word.
    let mut counters = [0_i64; 5];
    // Current id of each open container level.
    let mut open: [Value; 4] = Default::default();

    let mut atom_ids = Vec::new();
    let mut atom_ordinal = Vec::new();
    let mut atom_text = Vec::new();
    let mut atom_conf = Vec::new();
    let mut atom_geometry: [Vec<Value>; 4] = Default::default();

    for row in lines.filter(|l| !l.is_empty()) {
        let cells: Vec<&str> = row.split(',').collect();
        let level: usize = cells[level_col].parse().unwrap();
        counters[level - 1] += 1;

        let mut key = vec![Value::from(document_id)];
        key.extend(counters[..level].iter().map(|&c| Value::Int(c)));
        let id = Value::from(content_id(&key));
        let geom = geometry.map(|i| Value::Int(cells[i].parse().unwrap()));

        if level <= 4 {
            let slot = &mut levels[level - 1];
            slot.ids.push(id.clone());
            slot.parent.push(if level == 1 {
                Value::from(document_id)
            } else {
                open[level - 2].clone()
            });
            slot.ordinal.push(Value::Int(counters[level - 1]));
            let [left, top, width, height] = geom;
            slot.left.push(left);
            slot.top.push(top);
            slot.width.push(width);
            slot.height.push(height);
            open[level - 1] = id;
        } else {
            for (slot, container) in levels.iter_mut().zip(&open) {
                slot.members.push(Membership::new(
                    tessera::Id::from_value(container, "id").unwrap(),
                    tessera::Id::from_value(&id, "id").unwrap(),
                ));
            }
            atom_ids.push(id);
            atom_ordinal.push(Value::Int(counters[4]));
            atom_text.push(Value::from(cells[text_col]));
            atom_conf.push(Value::Float(cells[conf_col].parse().unwrap()));
            for (column, value) in atom_geometry.iter_mut().zip(geom) {
                column.push(value);
            }
        }
    }

    let n = atom_ids.len();
    let [left, top, width, height] = atom_geometry;
    let atoms = Table::from_columns([
        ("id", atom_ids.clone()),
        ("document", vec![Value::from(document_id); n]),
        ("ordinal", atom_ordinal),
        ("text", atom_text),
        ("conf", atom_conf),
        ("left", left),
        ("top", top),
        ("width", width),
        ("height", height),
    ])
    .unwrap();
    let corpus = Corpus::new(atoms).unwrap();

    let document = Chunks::new(
        &corpus,
        Table::from_columns([("id", vec![Value::from(document_id)])]).unwrap(),
        atom_ids
            .iter()
            .map(|atom| {
                Membership::new(document_id, tessera::Id::from_value(atom, "id").unwrap())
            })
            .collect(),
    )
    .unwrap();
    corpus.set_chunk("document", document).unwrap();

    let parents = ["document", "page", "block", "paragraph"];
    for ((name, parent), level) in LEVELS.iter().zip(parents).zip(levels) {
        let chunks = level.into_chunks(&corpus, parent);
        corpus.set_chunk(*name, chunks).unwrap();
    }
    corpus
}

/// The fixture corpus for document `abc123`.
pub fn ocr_corpus() -> Corpus {
    corpus_from_tesseract(TESSERACT_CSV, "abc123")
}

/// Column values as integers, panicking on anything else.
pub fn ints(values: &[Value]) -> Vec<i64> {
    values.iter().map(|v| v.as_int().unwrap()).collect()
}

/// Column values as strings, panicking on anything else.
pub fn strs(values: &[Value]) -> Vec<&str> {
    values.iter().map(|v| v.as_str().unwrap()).collect()
}

/// Sort a selected table by `ordinal`.
pub fn by_ordinal(table: Table) -> Table {
    table.sort_by("ordinal").unwrap()
}
