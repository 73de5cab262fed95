use crate::rectangle::Rectangle;
use geo::algorithm::bounding_rect::BoundingRect;
use geojson::GeoJson;

/// 几何互操作错误类型
#[derive(Debug, thiserror::Error)]
pub enum GeometryError {
    #[error("cannot compute a bounding box for an empty geometry")]
    EmptyGeometry,
    #[error("invalid GeoJSON: {0}")]
    InvalidGeoJson(String),
    #[error("unsupported GeoJSON type, expected Geometry or Feature")]
    UnsupportedGeoJson,
    #[error("feature has no geometry")]
    MissingGeometry,
}

/// 从 geo::Geometry 计算边界框
///
/// 任何几何体都以它的外接矩形参与空间索引；空的几何集合
/// 没有外接矩形，返回错误
pub fn geometry_to_bbox(geometry: &geo::Geometry) -> Result<Rectangle, GeometryError> {
    match geometry.bounding_rect() {
        Some(rect) => Ok(Rectangle {
            min: [rect.min().x, rect.min().y],
            max: [rect.max().x, rect.max().y],
        }),
        None => Err(GeometryError::EmptyGeometry),
    }
}

/// 将 GeoJSON 字符串转为边界框
///
/// 支持 GeoJSON 类型：Geometry 和 Feature
pub fn geojson_to_bbox(geojson_str: &str) -> Result<Rectangle, GeometryError> {
    let geojson = geojson_str
        .parse::<GeoJson>()
        .map_err(|e| GeometryError::InvalidGeoJson(e.to_string()))?;

    let geometry: geo::Geometry = match geojson {
        GeoJson::Geometry(g) => g
            .try_into()
            .map_err(|e: geojson::Error| GeometryError::InvalidGeoJson(e.to_string()))?,
        GeoJson::Feature(f) => f
            .geometry
            .ok_or(GeometryError::MissingGeometry)?
            .try_into()
            .map_err(|e: geojson::Error| GeometryError::InvalidGeoJson(e.to_string()))?,
        GeoJson::FeatureCollection(_) => return Err(GeometryError::UnsupportedGeoJson),
    };

    geometry_to_bbox(&geometry)
}
