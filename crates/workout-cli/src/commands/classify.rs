use workout_core::{classify, ActivityType};

pub fn run(value: &str) -> Result<(), Box<dyn std::error::Error>> {
    let label = match value.trim().parse::<u32>() {
        Ok(code) => classify(code),
        Err(_) => ActivityType::from_label(value).label(),
    };
    println!("{label}");
    Ok(())
}
