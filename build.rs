use std::env;
use std::fs;
use std::io::Write;
use std::path::Path;

const CONTINENTS: &[&str] = &[
    "Africa",
    "Asia",
    "Europe",
    "North America",
    "South America",
    "Oceania",
];

fn main() {
    println!("cargo:rerun-if-changed=assets/countries.tsv");

    let out_dir = env::var("OUT_DIR").unwrap();
    let dest_path = Path::new(&out_dir).join("country_table.rs");
    let mut f = fs::File::create(&dest_path).unwrap();

    let source = Path::new("assets").join("countries.tsv");
    if !source.exists() {
        writeln!(f, "pub const COUNTRY_ROWS: &[(&str, &str, &str)] = &[];").unwrap();
        return;
    }

    let content = fs::read_to_string(&source).unwrap();
    let mut seen_codes = Vec::new();

    writeln!(f, "pub const COUNTRY_ROWS: &[(&str, &str, &str)] = &[").unwrap();

    for (line_no, line) in content.lines().enumerate() {
        let line = line.trim_end();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        // code <TAB> name <TAB> continent
        let fields: Vec<&str> = line.split('\t').map(str::trim).collect();
        if fields.len() != 3 {
            panic!(
                "assets/countries.tsv:{}: expected 3 tab-separated fields, found {}",
                line_no + 1,
                fields.len()
            );
        }
        let (code, name, continent) = (fields[0], fields[1], fields[2]);

        if code.is_empty() || name.is_empty() {
            panic!("assets/countries.tsv:{}: empty code or name", line_no + 1);
        }
        if !CONTINENTS.contains(&continent) {
            panic!(
                "assets/countries.tsv:{}: unknown continent {:?}",
                line_no + 1,
                continent
            );
        }
        if seen_codes.iter().any(|c: &String| c == code) {
            panic!("assets/countries.tsv:{}: duplicate code {}", line_no + 1, code);
        }
        seen_codes.push(code.to_string());

        // {:?} produces escaped Rust string literals
        writeln!(f, "    ({:?}, {:?}, {:?}),", code, name, continent).unwrap();
    }

    writeln!(f, "];").unwrap();
}
