//! Run with: cargo run --bin seed

use audiodeck::config::{self, database::DatabaseConfig};
use audiodeck::modules::audio::{
    crud::AudioCrud,
    model::{AudioRecord, Language},
};
use audiodeck::services::migration::text_preview;
use audiodeck::store::{mongo::MongoStore, DocumentStore};

const ENGLISH_TEXT: &str = "In the ancient land of Eldoria, where skies shimmered and forests whispered secrets to the wind, lived a dragon named Zephyros. [sarcastically] Not the \"burn it all down\" kind... [giggles] but he was gentle, wise, with eyes like old stars. [whispers] Even the birds fell silent when he passed.";

const ARABIC_TEXT: &str = "في أرض إلدوريا القديمة، حيث تتلألأ السماء والغابات، همست الأسرار للريح، عاش تنين يُدعى زيفيروس. [بسخرية] ليس من النوع الذي \"يحرق كل شيء\"... [يضحك] بل كان لطيفاً وحكيماً، بعيون مثل النجوم القديمة. [يهمس] حتى الطيور صمتت عندما مر.";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    config::logging::init(false);

    let db_config = DatabaseConfig::from_env();
    println!("Connecting to MongoDB at {}...", db_config.redacted_uri());
    let store = MongoStore::open(&db_config).await?;
    println!("✓ Connected");

    let crud = AudioCrud::new(&store);
    let seeds = [
        (Language::English, "/audio_english.mp3", ENGLISH_TEXT),
        (Language::Arabic, "/audio_arabic.mp3", ARABIC_TEXT),
    ];

    for (language, audio_url, text) in seeds {
        let record = AudioRecord::new(language, audio_url.to_string(), text.to_string());
        let outcome = crud.upsert(&record).await?;
        println!("✓ {} record {}", language, outcome.as_str());
    }

    let count = crud.count().await?;
    println!("\nTotal records in audio_files collection: {}", count);

    for document in crud.find_all().await? {
        let language = document.get_str("language").unwrap_or("?");
        println!("  - {}: {}", language, text_preview(document.get_str("text").ok()));
    }

    store.close().await;
    println!("\n✓ Seed complete!");
    Ok(())
}
