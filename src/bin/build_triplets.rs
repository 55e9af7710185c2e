use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    triplets::apps::run_build_triplets(std::env::args().skip(1))
}
