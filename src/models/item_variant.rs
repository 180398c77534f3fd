use serde::{Deserialize, Serialize};

use crate::schema::{Choices, FieldSpec, FieldType, RecordShape, Schema};
use crate::shaping::ResponseShape;

const CAR_TAG: Choices = Choices {
    name: "CarType",
    variants: &["car"],
};

const PLANE_TAG: Choices = Choices {
    name: "PlaneType",
    variants: &["plane"],
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarItem {
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaneItem {
    pub description: String,
    pub size: i64,
}

/// A catalog entry that is either a car or a plane, tagged by `type`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ItemVariant {
    Car(CarItem),
    Plane(PlaneItem),
}

impl ItemVariant {
    pub fn description(&self) -> &str {
        match self {
            ItemVariant::Car(car) => &car.description,
            ItemVariant::Plane(plane) => &plane.description,
        }
    }

    pub fn response_shape() -> ResponseShape {
        ResponseShape::OneOf(vec![CarItem::shape(), PlaneItem::shape()])
    }
}

impl Schema for CarItem {
    fn shape() -> RecordShape {
        RecordShape::new("CarItem")
            .field(FieldSpec::required("type", FieldType::Choice(CAR_TAG)))
            .field(FieldSpec::required("description", FieldType::Str))
    }
}

impl Schema for PlaneItem {
    fn shape() -> RecordShape {
        RecordShape::new("PlaneItem")
            .field(FieldSpec::required("type", FieldType::Choice(PLANE_TAG)))
            .field(FieldSpec::required("description", FieldType::Str))
            .field(FieldSpec::required("size", FieldType::Int))
    }
}
