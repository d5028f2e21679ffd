use crate::error::Result;
use molbench::core::regression::registry::{RegistryEntry, RegressorRegistry};

pub fn run() -> Result<()> {
    let registry = RegressorRegistry::standard();
    println!("{} regressor(s) available for modelability:", registry.len());
    for entry in registry.entries() {
        print!("{}", describe(entry));
    }
    Ok(())
}

fn describe(entry: &RegistryEntry) -> String {
    let mut out = format!(
        "\n{} ({} candidate(s))\n",
        entry.name,
        entry.param_grid.combinations().len()
    );
    for (name, values) in entry.param_grid.axes() {
        let values = values
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        out.push_str(&format!("  {:<18} [{}]\n", name, values));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn description_lists_every_axis() {
        let registry = RegressorRegistry::standard();
        let entry = registry.get("support vector machine").unwrap();
        let text = describe(entry);
        assert!(text.starts_with("\nsupport vector machine (16 candidate(s))"));
        for (name, _) in entry.param_grid.axes() {
            assert!(text.contains(name));
        }
    }

    #[test]
    fn gridless_model_has_a_single_candidate() {
        let registry = RegressorRegistry::standard();
        let entry = registry.get("linear regression").unwrap();
        assert!(describe(entry).contains("(1 candidate(s))"));
    }
}
