use rx_core::diet::intake::{normalize_form, DietPlanForm};
use rx_core::telemetry;
use serde_json::Value;

fn main() {
    let args: Vec<String> = std::env::args().collect();
    if args.len() != 2 {
        eprintln!("usage: diet_intake <form.json>");
        std::process::exit(2);
    }
    telemetry::init("warn");

    let raw: Value = match std::fs::read(&args[1])
        .map_err(|e| e.to_string())
        .and_then(|b| serde_json::from_slice(&b).map_err(|e| e.to_string()))
    {
        Ok(v) => v,
        Err(e) => {
            eprintln!("cannot read form {}: {}", args[1], e);
            std::process::exit(2);
        }
    };
    let Some(fields) = raw.as_object() else {
        eprintln!("form must be a JSON object of field names to values");
        std::process::exit(2);
    };

    // Forms post every value as text; numbers and nulls are accepted the same way.
    let form: DietPlanForm = fields
        .iter()
        .map(|(k, v)| {
            let text = match v {
                Value::String(s) => s.clone(),
                Value::Null => String::new(),
                other => other.to_string(),
            };
            (k.clone(), text)
        })
        .collect();

    match normalize_form(&form).and_then(|input| Ok(serde_json::to_string_pretty(&input)?)) {
        Ok(out) => println!("{}", out),
        Err(e) => {
            eprintln!("diet intake error: {}", e);
            std::process::exit(1);
        }
    }
}
