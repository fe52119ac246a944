//! The openEO process listing.
//!
//! The backend predefines a single process, `load_collection`, which loads a
//! geoDB collection as a vector cube.

use serde_json::{json, Value};

/// Build the process listing document.
pub fn get_processes() -> Value {
    json!({
        "processes": [
            {
                "id": "load_collection",
                "summary": "Load a collection.",
                "categories": ["import"],
                "description": "Loads a collection from the current back-end \
                                by its id and returns it as a vector cube. \
                                The data that is added to the data cube can \
                                be restricted with the parameters \
                                \"spatial_extent\" and \"properties\".",
                "parameters": [
                    {
                        "name": "id",
                        "description": "The collection's name",
                        "schema": {
                            "type": "string"
                        }
                    },
                    {
                        "name": "database",
                        "description": "The database of the collection",
                        "schema": {
                            "type": "string"
                        },
                        "optional": true
                    },
                    {
                        "name": "spatial_extent",
                        "description": "Limits the data to load from the \
                                        collection to the specified bounding \
                                        box or polygons. Set this parameter \
                                        to null to set no limit for the \
                                        spatial extent.",
                        "schema": [
                            {
                                "title": "Bounding Box",
                                "type": "object",
                                "subtype": "bounding-box",
                                "required": ["west", "south", "east", "north"],
                                "properties": {
                                    "west": {
                                        "description": "West (lower left corner, coordinate axis 1).",
                                        "type": "number"
                                    },
                                    "south": {
                                        "description": "South (lower left corner, coordinate axis 2).",
                                        "type": "number"
                                    },
                                    "east": {
                                        "description": "East (upper right corner, coordinate axis 1).",
                                        "type": "number"
                                    },
                                    "north": {
                                        "description": "North (upper right corner, coordinate axis 2).",
                                        "type": "number"
                                    },
                                    "crs": {
                                        "description": "Coordinate reference system of the extent, specified as an EPSG code or WKT2 string. Defaults to 4326.",
                                        "anyOf": [
                                            {
                                                "title": "EPSG Code",
                                                "type": "integer",
                                                "subtype": "epsg-code",
                                                "minimum": 1000,
                                                "examples": [3857]
                                            },
                                            {
                                                "title": "WKT2",
                                                "type": "string",
                                                "subtype": "wkt2-definition"
                                            }
                                        ],
                                        "default": 4326
                                    }
                                }
                            },
                            {
                                "title": "GeoJSON",
                                "description": "Limits the data cube to the bounding box of the given geometry.",
                                "type": "object",
                                "subtype": "geojson"
                            },
                            {
                                "title": "No filter",
                                "description": "Don't filter spatially. All data is included in the data cube.",
                                "type": "null"
                            }
                        ]
                    }
                ],
                "returns": {
                    "description": "A vector cube for further processing.",
                    "schema": {
                        "type": "object",
                        "subtype": "vector-cube"
                    }
                }
            }
        ],
        "links": []
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_collection_is_listed() {
        let processes = get_processes();
        assert_eq!("load_collection", processes["processes"][0]["id"]);
        assert_eq!("import", processes["processes"][0]["categories"][0]);
        assert!(processes["links"].as_array().unwrap().is_empty());
    }

    #[test]
    fn spatial_extent_parameter() {
        let processes = get_processes();
        let parameters = processes["processes"][0]["parameters"].as_array().unwrap();
        let spatial_extent = parameters
            .iter()
            .find(|parameter| parameter["name"] == "spatial_extent")
            .unwrap();
        assert_eq!("Bounding Box", spatial_extent["schema"][0]["title"]);
        assert_eq!(
            json!(["west", "south", "east", "north"]),
            spatial_extent["schema"][0]["required"]
        );
    }
}
