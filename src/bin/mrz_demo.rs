use mrz_reader::models::ReaderConfig;
use mrz_reader::utils::MrzError;
use mrz_reader::MrzReader;

// A camera session where OCR misreads most frames.
const FRAMES: [&str; 4] = [
    "I<UTOD231458907<<<<<<<<<<<<<<<\n7408122F1204159UTO<<<<<<<<<<<6\nERIKSSON<<ANNA<MARIA<<<<<<<<<<",
    "I<UT0D23I458907<<<<<<<<<<\n74O8122F12",
    "",
    "<span class='ocrx_word'>I&lt;UTOD231458907&lt;&lt;&lt;</span>",
];

fn main() -> Result<(), MrzError> {
    env_logger::init();

    println!("MRZ Reader Demo");
    println!("---------------");

    let reader = MrzReader::new(ReaderConfig::default())?;
    for tick in 0..40 {
        let text = FRAMES[tick % FRAMES.len()];
        if let Some(mrz) = reader.submit_text(Some(text)) {
            println!("Stable MRZ after {} frames:", tick + 1);
            println!("  {}", mrz);

            let record = reader.decode_text(Some(&mrz))?;
            println!("  Document Number: {}", record.document_number);
            println!("  Name: {} {}", record.given_names, record.surname);
            println!("  Date of Birth: {}", record.birth_date);
            println!("  Date of Expiry: {}", record.expiry_date);
            return Ok(());
        }
    }

    println!("No stable MRZ after {} frames", reader.frames_seen());
    Ok(())
}
