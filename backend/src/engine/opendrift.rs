//! Built-in catalogue of the OpenDrift engine's configuration keys

use std::sync::LazyLock;

use super::{EngineCatalog, EngineLevel, EngineParam};
use crate::models::schema::{
    ParamKind, COASTLINE_ACTIONS, DIFFUSIVITY_MODELS, DROPLET_DISTRIBUTIONS, SEAFLOOR_ACTIONS,
};
use crate::models::value::ParamValue;
use crate::models::variant::DriftModel;

/// OpenDrift defaults for the four supported drift models
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenDriftCatalog;

impl EngineCatalog for OpenDriftCatalog {
    fn name(&self) -> &str {
        "opendrift"
    }

    fn params(&self, model: DriftModel) -> Vec<EngineParam> {
        TABLE
            .iter()
            .filter(|(variants, _)| variants.contains(&model))
            .map(|(_, param)| param.clone())
            .collect()
    }
}

const ALL: &[DriftModel] = &DriftModel::ALL;
const NOT_LEEWAY: &[DriftModel] = &[DriftModel::OceanDrift, DriftModel::LarvalFish, DriftModel::OpenOil];
const LARVAL_FISH: &[DriftModel] = &[DriftModel::LarvalFish];
const OPEN_OIL: &[DriftModel] = &[DriftModel::OpenOil];
const LEEWAY: &[DriftModel] = &[DriftModel::Leeway];

static TABLE: LazyLock<Vec<(&'static [DriftModel], EngineParam)>> = LazyLock::new(|| {
    use EngineLevel::{Advanced, Basic, Essential};
    use ParamKind as K;

    vec![
        (ALL, EngineParam::new("seed:number", K::Int, 1, Essential,
            "The number of elements for the simulation.")),
        (ALL, EngineParam::new("seed:z", K::Float, 0.0, Essential,
            "Depth below sea level where elements are released.")
            .range(-10000.0, 0.0).units("m")),
        (NOT_LEEWAY, EngineParam::new("seed:seafloor", K::Bool, false, Essential,
            "Elements are seeded at seafloor, and seeding depth (z) is neglected.")),
        (ALL, EngineParam::new("drift:horizontal_diffusivity", K::Float, 0.0, Advanced,
            "Add horizontal diffusivity (random walk).")
            .range(0.0, 100000.0).units("m2/s")),
        (ALL, EngineParam::new("drift:current_uncertainty", K::Float, 0.0, Advanced,
            "Add gaussian perturbation with this standard deviation to current components at each time step.")
            .range(0.0, 5.0).units("m/s")),
        (ALL, EngineParam::new("drift:wind_uncertainty", K::Float, 0.0, Advanced,
            "Add gaussian perturbation with this standard deviation to wind components at each time step.")
            .range(0.0, 5.0).units("m/s")),
        (ALL, EngineParam::new("drift:max_speed", K::Float, 1.0, Advanced,
            "Typical maximum speed of elements, used to estimate reader buffer size.")
            .range(0.0, 100.0).units("m/s")),
        (ALL, EngineParam::new("drift:advection_scheme", K::Enum(&["euler", "runge-kutta", "runge-kutta4"]), "euler", Advanced,
            "Numerical advection scheme for ocean current advection.")),
        (ALL, EngineParam::new("general:use_auto_landmask", K::Bool, true, Advanced,
            "A built-in GSHHG global landmask is used if True, otherwise landmask is taken from reader or fallback value.")),
        (ALL, EngineParam::new("general:coastline_action", K::Enum(COASTLINE_ACTIONS), "stranding", Basic,
            "None means that objects may also move over land. stranding means that objects are deactivated if they hit land. previous means that objects will move back to the previous location if they hit land.")),
        (NOT_LEEWAY, EngineParam::new("general:seafloor_action", K::Enum(SEAFLOOR_ACTIONS), "lift_to_seafloor", Advanced,
            "deactivate: elements are deactivated; lift_to_seafloor: elements are lifted to seafloor level; previous: elements are moved back to previous position; none: seafloor is ignored.")),
        (NOT_LEEWAY, EngineParam::new("drift:stokes_drift", K::Bool, true, Basic,
            "Advection elements with Stokes drift (wave orbital motion).")),
        (NOT_LEEWAY, EngineParam::new("drift:use_tabularised_stokes_drift", K::Bool, false, Advanced,
            "If True, Stokes drift is estimated from wind based on look-up-tables for given fetch.")),
        (NOT_LEEWAY, EngineParam::new("drift:tabularised_stokes_drift_fetch", K::Enum(&["5000", "25000", "50000"]), "25000", Advanced,
            "The fetch length when using tabularised Stokes drift.")),
        (NOT_LEEWAY, EngineParam::new("drift:stokes_drift_profile", K::Enum(&["monochromatic", "exponential", "Phillips", "windsea"]), "Phillips", Advanced,
            "The vertical profile of Stokes drift.")),
        (NOT_LEEWAY, EngineParam::new("drift:vertical_advection", K::Bool, true, Advanced,
            "Advect elements with vertical component of ocean current.")),
        (NOT_LEEWAY, EngineParam::new("drift:vertical_mixing", K::Bool, false, Basic,
            "Activate vertical mixing scheme with inner loop.")),
        (NOT_LEEWAY, EngineParam::new("drift:truncate_ocean_model_below_m", K::Float, ParamValue::Null, Advanced,
            "Ocean model data are only read down to at most this depth, and extrapolated below.")
            .range(0.0, 10000.0).units("m")),
        (NOT_LEEWAY, EngineParam::new("vertical_mixing:diffusivitymodel", K::Enum(DIFFUSIVITY_MODELS), "environment", Advanced,
            "Algorithm/source used for profile of vertical diffusivity.")),
        (NOT_LEEWAY, EngineParam::new("vertical_mixing:timestep", K::Float, 60.0, Advanced,
            "Time step used for inner loop of vertical mixing.")
            .range(0.1, 3600.0).units("seconds")),
        (NOT_LEEWAY, EngineParam::new("environment:fallback:ocean_mixed_layer_thickness", K::Float, 50.0, Advanced,
            "Fallback value for ocean_mixed_layer_thickness if not available from any reader.")
            .range(0.0, 1000.0).units("m")),
        (NOT_LEEWAY, EngineParam::new("seed:wind_drift_factor", K::Float, 0.02, Basic,
            "Elements at surface are moved with this fraction of the wind vector.")
            .range(0.0, 1.0).units("1")),
        (NOT_LEEWAY, EngineParam::new("drift:wind_drift_depth", K::Float, 0.1, Advanced,
            "The direct wind drift (windage) is linearly decreasing from the surface value until 0 at this depth.")
            .range(0.0, 10.0).units("m")),

        (LEEWAY, EngineParam::new("seed:object_type", K::Str, "Person-in-water (PIW), unknown state (mean values)", Essential,
            "Leeway object category for this simulation.")),
        (LEEWAY, EngineParam::new("seed:jibeProbability", K::Float, 0.04, Advanced,
            "Probability per hour for jibing (objects changing orientation).")
            .range(0.0, 1.0).units("probability per hour")),

        (LARVAL_FISH, EngineParam::new("seed:diameter", K::Float, 0.0014, Basic, "Seeding value of diameter.")
            .range(0.0, 0.1).units("m")),
        (LARVAL_FISH, EngineParam::new("seed:neutral_buoyancy_salinity", K::Float, 31.25, Basic,
            "Seeding value of neutral_buoyancy_salinity.")
            .range(5.0, 50.0).units("PSU")),
        (LARVAL_FISH, EngineParam::new("seed:stage_fraction", K::Float, 0.0, Basic, "Seeding value of stage_fraction.")
            .range(0.0, 1.0)),
        (LARVAL_FISH, EngineParam::new("seed:hatched", K::Float, 0.0, Basic, "Seeding value of hatched.")
            .range(0.0, 1.0)),
        (LARVAL_FISH, EngineParam::new("seed:length", K::Float, 0.0, Basic, "Seeding value of length.")
            .range(0.0, 100.0).units("mm")),
        (LARVAL_FISH, EngineParam::new("seed:weight", K::Float, 0.08, Basic, "Seeding value of weight.")
            .range(0.0, 100.0).units("mg")),

        (OPEN_OIL, EngineParam::new("seed:oil_type", K::Str, "GENERIC BUNKER C", Essential,
            "Oil type to be used for the simulation, from the NOAA ADIOS database.")),
        (OPEN_OIL, EngineParam::new("seed:m3_per_hour", K::Float, 1.0, Essential,
            "The amount (volume) of oil released per hour (or total amount if release is instantaneous).")
            .range(0.0, 1.0e8).units("m3 per hour")),
        (OPEN_OIL, EngineParam::new("seed:oil_film_thickness", K::Float, 0.001, Advanced,
            "Seeding value of oil_film_thickness.")
            .range(0.0, 1.0).units("m")),
        (OPEN_OIL, EngineParam::new("seed:droplet_size_distribution", K::Enum(DROPLET_DISTRIBUTIONS), "uniform", Advanced,
            "Droplet size distribution used for subsea release.")),
        (OPEN_OIL, EngineParam::new("seed:droplet_diameter_mu", K::Float, 0.001, Advanced,
            "The mean diameter of oil droplet for a subsea release, used in normal/lognormal distributions.")
            .range(1.0e-8, 1.0).units("m")),
        (OPEN_OIL, EngineParam::new("seed:droplet_diameter_sigma", K::Float, 0.0005, Advanced,
            "The standard deviation in diameter of oil droplet for a subsea release, used in normal/lognormal distributions.")
            .range(1.0e-8, 1.0).units("m")),
        (OPEN_OIL, EngineParam::new("seed:droplet_diameter_min_subsea", K::Float, 0.0005, Advanced,
            "The minimum diameter of oil droplet for a subsea release, used in uniform distribution.")
            .range(1.0e-8, 1.0).units("m")),
        (OPEN_OIL, EngineParam::new("seed:droplet_diameter_max_subsea", K::Float, 0.005, Advanced,
            "The maximum diameter of oil droplet for a subsea release, used in uniform distribution.")
            .range(1.0e-8, 1.0).units("m")),
        (OPEN_OIL, EngineParam::new("processes:emulsification", K::Bool, true, Basic,
            "Surface oil is emulsified, i.e. water droplets are mixed into oil due to wave mixing.")),
        (OPEN_OIL, EngineParam::new("processes:dispersion", K::Bool, true, Basic,
            "Oil is removed from simulation (dispersed), if entrained as very small droplets.")),
        (OPEN_OIL, EngineParam::new("processes:evaporation", K::Bool, true, Basic,
            "Surface oil is evaporated.")),
        (OPEN_OIL, EngineParam::new("processes:update_oilfilm_thickness", K::Bool, false, Advanced,
            "Oil film thickness is calculated at each time step.")),
        (OPEN_OIL, EngineParam::new("processes:biodegradation", K::Bool, false, Basic,
            "Oil mass is biodegraded (eaten by bacteria).")),
    ]
});
