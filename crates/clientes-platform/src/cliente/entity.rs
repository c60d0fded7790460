//! Cliente Entity

use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// Cliente document as stored in the `clientes` collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cliente {
    /// Assigned on first save, never changed afterwards.
    /// Stored as an ObjectId when it is one in hex form.
    #[serde(
        rename = "_id",
        default,
        skip_serializing_if = "Option::is_none",
        with = "object_id_hex"
    )]
    pub id: Option<String>,

    pub nombre: String,

    pub apellido: String,

    pub edad: i32,

    pub sueldo: f64,
}

impl Cliente {
    pub fn new(nombre: impl Into<String>, apellido: impl Into<String>, edad: i32, sueldo: f64) -> Self {
        Self {
            id: None,
            nombre: nombre.into(),
            apellido: apellido.into(),
            edad,
            sueldo,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn is_persisted(&self) -> bool {
        self.id.as_deref().is_some_and(|id| !id.is_empty())
    }

    /// Assign a fresh identifier unless one is already set.
    /// Returns true when the cliente had none.
    pub fn ensure_id(&mut self) -> bool {
        if self.id.is_some() {
            return false;
        }
        self.id = Some(Self::generate_id());
        true
    }

    /// New document identifier, the hex form of a fresh ObjectId
    pub fn generate_id() -> String {
        ObjectId::new().to_hex()
    }
}

/// `_id` codec: hex strings go out as ObjectId, ObjectId or string come back as hex/string
mod object_id_hex {
    use bson::{oid::ObjectId, Bson};
    use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(id: &Option<String>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match id.as_deref().map(ObjectId::parse_str) {
            Some(Ok(oid)) => oid.serialize(serializer),
            _ => id.serialize(serializer),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<Bson>::deserialize(deserializer)? {
            Some(Bson::ObjectId(oid)) => Ok(Some(oid.to_hex())),
            Some(Bson::String(s)) => Ok(Some(s)),
            None | Some(Bson::Null) => Ok(None),
            Some(other) => Err(de::Error::custom(format!(
                "unsupported _id type {:?}",
                other.element_type()
            ))),
        }
    }
}
