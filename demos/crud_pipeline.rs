//! End-to-end walkthrough: connect, compose a CRUD pipeline, run it once,
//! observe the outcome through fold.
//!
//! Run with: cargo run --example crud_pipeline

use driftwood::store::memory;
use driftwood::{doc, ops, Outcome};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let client = match memory::connect("memory://harbor").run(&()).await {
        Outcome::Success(client) => client,
        Outcome::Failure(err) => {
            eprintln!("connect failed: {err}");
            return;
        }
    };
    let db = client.database("fleet");

    // A pure description: nothing below touches the store yet.
    let pipeline = ops::insert_many(
        "ships",
        vec![
            doc! { "name": "dawn-treader", "status": "moored" },
            doc! { "name": "erebus", "status": "moored" },
            doc! { "name": "beagle", "status": "under way" },
        ],
    )
    .and_then(|ships| {
        println!("registered {} ships", ships.len());
        ops::update_one(
            "ships",
            doc! { "name": "erebus" },
            doc! { "status": "under way" },
        )
    })
    .and_then(|departed| {
        if let Some(ship) = &departed {
            println!("{} set sail", ship.fields["name"]);
        }
        ops::delete_many("ships", doc! { "status": "moored" })
    });

    pipeline.run(&db).await.fold(
        |err| eprintln!("pipeline failed: {err}"),
        |scrapped| {
            for ship in &scrapped {
                println!("scrapped {}", ship.fields["name"]);
            }
        },
    );
}
