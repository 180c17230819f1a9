//! Upstream spawn-data source
//!
//! Queries the remote GraphQL endpoint for one mode's map list and decodes
//! the nested maps/bosses/locations shape into the snapshot model. The
//! endpoint is a black box: it either yields the full shape or the query
//! fails as one of the [`FetchError`] arms.

use std::time::Duration;

use async_trait::async_trait;
use bosswatch_types::{BossEncounter, BossInfo, GameMode, MapEntry, SpawnLocation};
use serde::Deserialize;
use tracing::debug;

use super::error::FetchError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Query interface over the remote spawn-data source.
#[async_trait]
pub trait SpawnSource: Send + Sync {
    async fn fetch(&self, mode: GameMode) -> Result<Vec<MapEntry>, FetchError>;
}

/// Production source backed by the public GraphQL API.
pub struct GraphqlSpawnSource {
    client: reqwest::Client,
    endpoint: String,
}

impl GraphqlSpawnSource {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }

    fn query_for(mode: GameMode) -> String {
        format!(
            "{{ maps(gameMode: {}) {{ name bosses {{ boss {{ name health imagePortraitLink }} \
             spawnChance spawnLocations {{ name chance }} escorts {{ boss {{ name }} }} }} }} }}",
            mode.wire_name()
        )
    }
}

#[async_trait]
impl SpawnSource for GraphqlSpawnSource {
    async fn fetch(&self, mode: GameMode) -> Result<Vec<MapEntry>, FetchError> {
        debug!(mode = mode.wire_name(), "querying spawn data source");

        let response = self
            .client
            .post(&self.endpoint)
            .timeout(REQUEST_TIMEOUT)
            .json(&serde_json::json!({ "query": Self::query_for(mode) }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
            });
        }

        let body: GraphqlResponse = response.json().await?;
        if let Some(error) = body.errors.into_iter().next() {
            return Err(FetchError::Upstream {
                message: error.message,
            });
        }

        let maps = body
            .data
            .and_then(|data| data.maps)
            .ok_or_else(|| FetchError::MissingFields {
                detail: "data.maps".to_string(),
            })?;
        decode_maps(maps)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Wire shape
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct GraphqlResponse {
    data: Option<ResponseData>,
    #[serde(default)]
    errors: Vec<GraphqlError>,
}

#[derive(Debug, Deserialize)]
struct GraphqlError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct ResponseData {
    maps: Option<Vec<RawMap>>,
}

#[derive(Debug, Deserialize)]
struct RawMap {
    name: Option<String>,
    bosses: Option<Vec<RawEncounter>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEncounter {
    boss: Option<RawBoss>,
    spawn_chance: Option<f64>,
    #[serde(default)]
    spawn_locations: Vec<RawLocation>,
    #[serde(default)]
    escorts: Vec<RawEscort>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawBoss {
    name: Option<String>,
    health: Option<u32>,
    image_portrait_link: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawLocation {
    name: Option<String>,
    chance: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawEscort {
    boss: Option<RawBoss>,
}

/// A map without a name or boss list, or an encounter without a boss name or
/// spawn chance, fails the whole response. Location rows degrade to the
/// Unknown placeholder instead; the feed routinely leaves them sparse.
fn decode_maps(raw: Vec<RawMap>) -> Result<Vec<MapEntry>, FetchError> {
    let missing = |detail: &str| FetchError::MissingFields {
        detail: detail.to_string(),
    };

    let mut maps = Vec::with_capacity(raw.len());
    for raw_map in raw {
        let name = raw_map.name.ok_or_else(|| missing("map.name"))?;
        let bosses = raw_map
            .bosses
            .ok_or_else(|| missing("map.bosses"))?
            .into_iter()
            .map(decode_encounter)
            .collect::<Result<Vec<_>, _>>()?;
        maps.push(MapEntry { name, bosses });
    }
    Ok(maps)
}

fn decode_encounter(raw: RawEncounter) -> Result<BossEncounter, FetchError> {
    let missing = |detail: &str| FetchError::MissingFields {
        detail: detail.to_string(),
    };

    let boss = raw.boss.ok_or_else(|| missing("bosses.boss"))?;
    let name = boss.name.ok_or_else(|| missing("boss.name"))?;
    let spawn_chance = raw.spawn_chance.ok_or_else(|| missing("bosses.spawnChance"))?;

    let spawn_locations = raw
        .spawn_locations
        .into_iter()
        .map(|location| SpawnLocation {
            name: location
                .name
                .unwrap_or_else(|| SpawnLocation::UNKNOWN_NAME.to_string()),
            chance: location.chance.unwrap_or(0.0),
        })
        .collect();

    let escorts = raw
        .escorts
        .into_iter()
        .filter_map(|escort| escort.boss.and_then(|boss| boss.name))
        .collect();

    Ok(BossEncounter {
        boss: BossInfo {
            name,
            health: boss.health,
            portrait: boss.image_portrait_link,
            escorts,
        },
        spawn_chance,
        spawn_locations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(value: serde_json::Value) -> Result<Vec<MapEntry>, FetchError> {
        let raw: Vec<RawMap> = serde_json::from_value(value).unwrap();
        decode_maps(raw)
    }

    #[test]
    fn decodes_full_nested_shape() {
        let maps = decode(serde_json::json!([{
            "name": "Customs",
            "bosses": [{
                "boss": {
                    "name": "Reshala",
                    "health": 882,
                    "imagePortraitLink": "https://example.test/reshala.webp"
                },
                "spawnChance": 0.35,
                "spawnLocations": [
                    { "name": "Dorms", "chance": 0.5 },
                    { "name": null, "chance": null }
                ],
                "escorts": [
                    { "boss": { "name": "Guard" } },
                    { "boss": null }
                ]
            }]
        }]))
        .unwrap();

        assert_eq!(maps.len(), 1);
        let encounter = &maps[0].bosses[0];
        assert_eq!(encounter.boss.name, "Reshala");
        assert_eq!(encounter.boss.health, Some(882));
        assert_eq!(encounter.boss.escorts, vec!["Guard".to_string()]);
        assert_eq!(encounter.spawn_chance, 0.35);
        // Sparse location row degraded to the placeholder
        assert_eq!(encounter.spawn_locations[1].name, "Unknown");
        assert_eq!(encounter.spawn_locations[1].chance, 0.0);
    }

    #[test]
    fn missing_boss_name_fails_the_response() {
        let result = decode(serde_json::json!([{
            "name": "Customs",
            "bosses": [{ "boss": {}, "spawnChance": 0.35 }]
        }]));
        assert!(matches!(result, Err(FetchError::MissingFields { .. })));
    }

    #[test]
    fn missing_spawn_chance_fails_the_response() {
        let result = decode(serde_json::json!([{
            "name": "Customs",
            "bosses": [{ "boss": { "name": "Reshala" } }]
        }]));
        assert!(matches!(result, Err(FetchError::MissingFields { .. })));
    }

    #[test]
    fn missing_map_fields_fail_the_response() {
        assert!(matches!(
            decode(serde_json::json!([{ "bosses": [] }])),
            Err(FetchError::MissingFields { .. })
        ));
        assert!(matches!(
            decode(serde_json::json!([{ "name": "Customs" }])),
            Err(FetchError::MissingFields { .. })
        ));
    }

    #[test]
    fn empty_map_list_is_valid() {
        assert!(decode(serde_json::json!([])).unwrap().is_empty());
    }
}
