fn main() {
    let Some(input) = std::env::args().nth(1) else {
        eprintln!("Usage: groq-parser <QUERY>");
        std::process::exit(2);
    };

    println!("Trying to parse the following query:\n{}\n", input);

    match groq_parser::Node::parse(&input) {
        Ok(query) => {
            println!("✅ Valid query");
            println!("{}", query);
            println!("{:#?}", query);
        }
        Err(e) => {
            println!("❎ Invalid query");
            println!("{}", e);
        }
    }
}
