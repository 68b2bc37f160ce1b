use protocol_risk::{ClassifierError, ModelRegistry, PriorModel, RiskClassifier};
use std::collections::HashMap;

fn prior(p: f32) -> Box<dyn RiskClassifier> {
    Box::new(PriorModel::new(p).unwrap())
}

#[test]
fn test_duplicate_category() {
    let result = ModelRegistry::builder()
        .add_category("legal", PriorModel::new(0.1).unwrap())
        .and_then(|builder| builder.add_category("legal", PriorModel::new(0.2).unwrap()));

    assert!(matches!(result, Err(ClassifierError::ArtifactLoad(_))));
}

#[test]
fn test_many_categories() -> Result<(), ClassifierError> {
    let mut builder = ModelRegistry::builder();
    for i in 0..10 {
        builder = builder.add_category(format!("risk_{}", i), PriorModel::new(i as f32 / 10.0)?)?;
    }

    let registry = builder.build()?;
    assert_eq!(registry.len(), 10);
    let expected: Vec<String> = (0..10).map(|i| format!("risk_{}", i)).collect();
    assert_eq!(registry.categories(), expected.as_slice());
    Ok(())
}

#[test]
fn test_unbound_category_fails_load() {
    let mut classifiers = HashMap::new();
    classifiers.insert("legal".to_string(), prior(0.82));

    let result = ModelRegistry::from_parts(
        vec!["legal".to_string(), "privacy".to_string()],
        classifiers,
    );
    assert!(matches!(result, Err(ClassifierError::ArtifactLoad(msg)) if msg.contains("privacy")));
}

#[test]
fn test_unknown_category_lookup() -> Result<(), ClassifierError> {
    let registry = ModelRegistry::builder()
        .add_category("legal", PriorModel::new(0.82)?)?
        .build()?;

    assert!(registry.contains("legal"));
    assert!(!registry.contains("Legal"));
    let result = registry.classifier_for("Legal");
    assert!(matches!(result, Err(ClassifierError::UnknownCategory(name)) if name == "Legal"));
    Ok(())
}

#[test]
fn test_categories_stable_across_calls() -> Result<(), ClassifierError> {
    let mut classifiers = HashMap::new();
    let order = ["privacy", "safety", "legal", "data"];
    for name in order {
        classifiers.insert(name.to_string(), prior(0.5));
    }
    let registry =
        ModelRegistry::from_parts(order.iter().map(|s| s.to_string()).collect(), classifiers)?;

    for _ in 0..3 {
        assert_eq!(registry.categories(), order);
    }
    Ok(())
}

#[test]
fn test_empty_registry() -> Result<(), ClassifierError> {
    let registry = ModelRegistry::builder().build()?;
    assert!(registry.is_empty());
    let table = protocol_risk::classify("text", &registry, &Default::default())?;
    assert!(table.is_empty());
    Ok(())
}
