use entities::ENTITIES;
use std::io::Write;
use std::{env, path::PathBuf};

fn main() {
    let out_dir: PathBuf = env::var("OUT_DIR").unwrap().parse().unwrap();

    // entity::unescape is handed just the inner entity name, like "amp" for
    // "&amp;"; only entries with a trailing ";" take part.
    //
    // entities::ENTITIES includes many both with and without the ";", and
    // is not sorted.  Strip the delimiters first and sort by the bare name,
    // since that is exactly what the lookup binary-searches on ("sup" and
    // "sup1" order differently with the delimiters attached).
    let mut translated_entities: Vec<(&str, &str)> = ENTITIES
        .iter()
        .filter(|e| e.entity.starts_with('&') && e.entity.ends_with(';'))
        .map(|e| (&e.entity[1..e.entity.len() - 1], e.characters))
        .collect();
    translated_entities.sort_by_key(|&(name, _)| name);
    translated_entities.dedup_by_key(|&mut (name, _)| name);

    let out = std::fs::File::create(out_dir.join("entitydata.rs")).unwrap();
    let mut bw = std::io::BufWriter::new(out);
    writeln!(bw, "mod entitydata {{").unwrap();
    writeln!(
        bw,
        "    pub static TRANSLATED_ENTITIES: &[(&'static str, &'static str); {}] = &[",
        translated_entities.len()
    )
    .unwrap();
    for (name, characters) in translated_entities {
        writeln!(bw, "        ({:?}, {:?}),", name, characters).unwrap();
    }
    writeln!(bw, "    ];").unwrap();
    writeln!(bw, "}}").unwrap();
}
