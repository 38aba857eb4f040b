use bindery::form::{FormDeclaration, FormModel};

#[derive(Clone, bindery::form::FormModel)]
struct DemoForm {
    email: String,
    nickname: String,
}

fn main() {
    let fields = DemoForm::fields();
    assert_eq!(fields.email().as_str(), "email");
    assert_eq!(fields.nickname().as_str(), "nickname");

    let model = DemoForm {
        email: "a@example.com".to_string(),
        nickname: String::new(),
    };
    let declaration = FormDeclaration::from_model(&model);
    assert_eq!(declaration.fields().len(), 2);

    let values = model.to_values().into_iter().collect();
    let restored = DemoForm::from_values(&values);
    assert_eq!(restored.email, "a@example.com");
    assert!(restored.nickname.is_empty());
}
