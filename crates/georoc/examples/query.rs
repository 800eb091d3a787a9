//! Example: load a repository and query the resulting database.
//!
//! Run with: cargo run --example query -- <repos-dir>

use georoc::{Georoc, NoProgress};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let root = std::env::args().nth(1).unwrap_or_else(|| ".".to_string());
    let georoc = Georoc::open(&root)?;

    let db = georoc.database();
    if !db.exists() {
        let summary = georoc.create_db(false, NoProgress)?;
        println!("Loaded {} samples from {} files", summary.samples, summary.files);
    }

    let rows = db.query(
        "SELECT f.section, count(*) AS samples, avg(s.LATITUDE_MIN) AS mean_latitude \
         FROM sample AS s JOIN file AS f ON s.file_id = f.id \
         GROUP BY f.section ORDER BY samples DESC",
    )?;
    for row in rows {
        println!("{}", serde_json::to_string(&row)?);
    }
    Ok(())
}
