// src/macros.rs
#[macro_export]
macro_rules! s {
    // String shorthand!

    // Zero-arg → String::new()
    () => {
        ::std::string::String::new()
    };
    // Any single expression: works for literals, consts, or vars
    ($expr:expr) => {
        ::std::string::String::from($expr)
    };
}

#[macro_export]
macro_rules! fields {
    // Raw field list shorthand: fields! { "id" => "X-1", "title" => "Foo" }
    ($($key:expr => $value:expr),* $(,)?) => {
        vec![$( (::std::string::String::from($key), ::std::string::String::from($value)) ),*]
    };
}
