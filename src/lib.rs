pub mod core;
pub mod index;
pub mod query;
pub mod parse;
pub mod ingest;
pub mod console;

/*
┌──────────────────────────────────────────────────────────────────────────────┐
│                              CLOG DATA FLOW                                  │
└──────────────────────────────────────────────────────────────────────────────┘

  child stdout ──► Ingestor::ingest_stream ──► Session::ingest
                                                  │
                         ┌────────────────────────┼──────────────────────┐
                         ▼                        ▼                      ▼
                  RawBuffer::append        ParseStrategy::parse    LineStore::push
                  (raw text, offsets)      (Json | Text, once)     (global history)
                                                  │
                                                  ▼
                                         FieldIndex::index
                                                  │
                 key_map: HashMap<key, slot> ──► nodes[slot]: ValueNode
                                                  │ values sorted by bytes
                                                  ▼
                                         Leaf { value, lines: LineStore }

  query "a=x b=y" ──► QueryParser ──► FieldIndex::find ──► QueryEngine
                                                  │ lookup only, no inserts
                                                  ▼
                                   intersect(candidate LineStores)
                                                  │
                                                  ▼
                          Vec<Line> ──► Session::resolve ──► raw text
*/
