use chrono::NaiveDate;
use xml_gen::{XmlGenError, XmlGenerator};

fn main() -> Result<(), XmlGenError> {
    let released = NaiveDate::from_ymd_opt(2024, 5, 17)
        .expect("valid date")
        .and_hms_milli_opt(13, 45, 30, 250)
        .expect("valid time");

    // Build a small catalog document into an in-memory buffer.
    let mut generator = XmlGenerator::common();
    generator
        .write_xml_start()?
        .write_open_tag("catalog")?
        .write_attribute("count", "1")?
        .write_close_tag()?
        .write_open_tag_ns("shop", "item")?
        .write_attribute("name", "a \"quoted\" name")?
        .write_close_tag()?
        .write_node_text("", "price", "")?
        .write_node_start("released")?
        .write(released)?
        .write_close_node()?
        .write_close_node()?
        .write_close_node()?;

    println!("{}", generator.render().unwrap_or_default());

    // The same API streams to any io::Write destination.
    let mut streamed = XmlGenerator::from_stream(std::io::stdout());
    streamed
        .write_xml_start()?
        .write_node_text("shop", "greeting", "hello")?;
    println!();

    Ok(())
}
