mod identifier;
mod name;
mod variant;

pub use self::identifier::Identifier;
pub use self::name::ImageName;
pub use self::variant::Variant;
