//! Writes a synthetic department extract with the RNA column layout, so the
//! preview, ETL and chart programs can be tried without the real download.

use anyhow::{Context, Result};

const STREETS: &[&str] = &[
    "avenue Daumesnil",
    "rue de Charenton",
    "boulevard Diderot",
    "rue de Lyon",
    "avenue du Général Michel Bizot",
    "rue de Reuilly",
    "cours de Vincennes",
    "rue Crozatier",
];

const PURPOSES: &[&str] = &[
    "Culture, pratiques d'activités artistiques, pratiques culturelles",
    "Sports, activités de plein air",
    "Education, formation",
    "Action sociale",
    "Amicales, groupements affinitaires, groupements d'entraide",
    "Santé",
];

const POSTAL_CODES: &[&str] = &["75012", "75012", "75012", "75011", "75020", "75004"];

const HEADER: &[&str] = &[
    "id",
    "id_ex",
    "siret",
    "gestion",
    "date_creat",
    "date_decla",
    "date_publi",
    "nature",
    "groupement",
    "titre",
    "titre_court",
    "objet",
    "objet_social1",
    "objet_social2",
    "adr1",
    "adr2",
    "adr3",
    "adrs_codepostal",
    "libcom",
    "siteweb",
    "position",
];

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn below(&mut self, n: u64) -> u64 {
        self.next_u64() % n
    }

    fn chance(&mut self, percent: u64) -> bool {
        self.below(100) < percent
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[self.below(items.len() as u64) as usize]
    }
}

fn association(rng: &mut SimpleRng, n: usize) -> Vec<String> {
    let year = 1950 + rng.below(75);
    let month = 1 + rng.below(12);
    let day = 1 + rng.below(28);
    // the registry uses 0001-01-01 when the creation date is unknown
    let date_creat = if rng.chance(5) {
        "0001-01-01".to_string()
    } else {
        format!("{year}-{month:02}-{day:02}")
    };
    let date_publi = format!("{}-{month:02}-{day:02}", year + rng.below(2));
    let purpose = if rng.chance(10) { "" } else { rng.pick(PURPOSES) };
    let street = if rng.chance(5) {
        String::new()
    } else {
        format!("{} {}", 1 + rng.below(180), rng.pick(STREETS))
    };
    let site = if rng.chance(30) {
        format!("https://asso-{n}.example.fr")
    } else {
        String::new()
    };

    vec![
        format!("W75{:07}", n),
        String::new(),
        String::new(),
        "751P".to_string(),
        date_creat,
        String::new(),
        date_publi,
        "D".to_string(),
        "S".to_string(),
        format!("  Association numéro {n} "),
        String::new(),
        format!("{purpose} dans le quartier"),
        purpose.to_string(),
        String::new(),
        street,
        String::new(),
        String::new(),
        rng.pick(POSTAL_CODES).to_string(),
        "PARIS".to_string(),
        site,
        "A".to_string(),
    ]
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let output_path = "rna_import_20250901_dpt_75.csv";

    let mut writer = csv::WriterBuilder::new()
        .delimiter(b';')
        .flexible(true)
        .from_path(output_path)
        .with_context(|| format!("création de {output_path}"))?;
    writer.write_record(HEADER)?;

    let count = 2000;
    let mut written = 0;
    for n in 0..count {
        let row = association(&mut rng, n);
        writer.write_record(&row)?;
        written += 1;

        // re-declared associations show up twice in the extracts
        if rng.chance(3) {
            writer.write_record(&row)?;
            written += 1;
        }
        if n % 500 == 499 {
            writer.write_record(["W75BROKEN", "ligne tronquée"])?;
            written += 1;
        }
    }
    writer.flush()?;

    println!("Wrote {written} rows ({} columns) to {output_path}", HEADER.len());
    Ok(())
}
