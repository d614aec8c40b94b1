/*
    Koios, SPICE kernel access and comparison tooling
    Copyright (C) 2024 Koios Developers

    This program is free software: you can redistribute it and/or modify
    it under the terms of the GNU Affero General Public License as published
    by the Free Software Foundation, either version 3 of the License, or
    (at your option) any later version.

    This program is distributed in the hope that it will be useful,
    but WITHOUT ANY WARRANTY; without even the implied warranty of
    MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
    GNU Affero General Public License for more details.

    You should have received a copy of the GNU Affero General Public License
    along with this program.  If not, see <https://www.gnu.org/licenses/>.
*/

//! Built-in body ID / name assignments.
//!
//! A script generates this table from the NAIF ID list. Do not edit by
//! hand; edit the generation script instead.
//!
//! Each entry maps one name to one ID. Several names may share an ID, and
//! an ID may appear many times; the catalog resolves collisions by taking
//! the definition appearing last in this table.

/// Count of built-in assignments.
pub const NPERM: usize = 180;

#[rustfmt::skip]
pub(crate) const BUILTIN: [(i32, &str); NPERM] = [
    (0, "SSB"),
    (0, "SOLAR SYSTEM BARYCENTER"),
    (1, "MERCURY BARYCENTER"),
    (2, "VENUS BARYCENTER"),
    (3, "EMB"),
    (3, "EARTH MOON BARYCENTER"),
    (3, "EARTH-MOON BARYCENTER"),
    (3, "EARTH BARYCENTER"),
    (4, "MARS BARYCENTER"),
    (5, "JUPITER BARYCENTER"),
    (6, "SATURN BARYCENTER"),
    (7, "URANUS BARYCENTER"),
    (8, "NEPTUNE BARYCENTER"),
    (9, "PLUTO BARYCENTER"),
    (10, "SUN"),
    (199, "MERCURY"),
    (299, "VENUS"),
    (399, "EARTH"),
    (301, "MOON"),
    (499, "MARS"),
    (401, "PHOBOS"),
    (402, "DEIMOS"),
    (599, "JUPITER"),
    (501, "IO"),
    (502, "EUROPA"),
    (503, "GANYMEDE"),
    (504, "CALLISTO"),
    (505, "AMALTHEA"),
    (506, "HIMALIA"),
    (507, "ELARA"),
    (508, "PASIPHAE"),
    (509, "SINOPE"),
    (510, "LYSITHEA"),
    (511, "CARME"),
    (512, "ANANKE"),
    (513, "LEDA"),
    (514, "THEBE"),
    (515, "ADRASTEA"),
    (516, "METIS"),
    (699, "SATURN"),
    (601, "MIMAS"),
    (602, "ENCELADUS"),
    (603, "TETHYS"),
    (604, "DIONE"),
    (605, "RHEA"),
    (606, "TITAN"),
    (607, "HYPERION"),
    (608, "IAPETUS"),
    (609, "PHOEBE"),
    (610, "JANUS"),
    (611, "EPIMETHEUS"),
    (612, "HELENE"),
    (613, "TELESTO"),
    (614, "CALYPSO"),
    (615, "ATLAS"),
    (616, "PROMETHEUS"),
    (617, "PANDORA"),
    (618, "PAN"),
    (799, "URANUS"),
    (701, "ARIEL"),
    (702, "UMBRIEL"),
    (703, "TITANIA"),
    (704, "OBERON"),
    (705, "MIRANDA"),
    (706, "CORDELIA"),
    (707, "OPHELIA"),
    (708, "BIANCA"),
    (709, "CRESSIDA"),
    (710, "DESDEMONA"),
    (711, "JULIET"),
    (712, "PORTIA"),
    (713, "ROSALIND"),
    (714, "BELINDA"),
    (715, "PUCK"),
    (899, "NEPTUNE"),
    (801, "TRITON"),
    (802, "NEREID"),
    (803, "NAIAD"),
    (804, "THALASSA"),
    (805, "DESPINA"),
    (806, "GALATEA"),
    (807, "LARISSA"),
    (808, "PROTEUS"),
    (999, "PLUTO"),
    (901, "CHARON"),
    (902, "NIX"),
    (903, "HYDRA"),
    (-12, "P12"),
    (-12, "PIONEER 12"),
    (-12, "VENUS ORBITER"),
    (-18, "MGN"),
    (-18, "MAGELLAN"),
    (-23, "P10"),
    (-23, "PIONEER-10"),
    (-24, "P11"),
    (-24, "PIONEER-11"),
    (-25, "LP"),
    (-25, "LUNAR PROSPECTOR"),
    (-27, "VK1"),
    (-27, "VIKING 1 ORBITER"),
    (-30, "VK2"),
    (-30, "VIKING 2 ORBITER"),
    (-31, "VG1"),
    (-31, "VOYAGER 1"),
    (-32, "VG2"),
    (-32, "VOYAGER 2"),
    (-40, "CLEMENTINE"),
    (-41, "MEX"),
    (-41, "MARS EXPRESS"),
    (-48, "HST"),
    (-48, "HUBBLE SPACE TELESCOPE"),
    (-53, "MPF"),
    (-53, "MARS PATHFINDER"),
    (-55, "ULS"),
    (-55, "ULYSSES"),
    (-61, "JUNO"),
    (-74, "MRO"),
    (-74, "MARS RECON ORBITER"),
    (-76, "MSL"),
    (-76, "MARS SCIENCE LABORATORY"),
    (-76, "CURIOSITY"),
    (-77, "GLL"),
    (-77, "GALILEO ORBITER"),
    (-78, "GIOTTO"),
    (-82, "CAS"),
    (-82, "CASSINI"),
    (-85, "LRO"),
    (-85, "LUNAR RECON ORBITER"),
    (-86, "CH1"),
    (-86, "CHANDRAYAAN-1"),
    (-93, "NEAR"),
    (-93, "NEAR EARTH ASTEROID RENDEZVOUS"),
    (-94, "MO"),
    (-94, "MARS OBSERVER"),
    (-95, "MGS"),
    (-95, "MARS GLOBAL SURVEYOR"),
    (-98, "NH"),
    (-98, "NEW HORIZONS"),
    (-140, "EPOXI"),
    (-140, "DEEP IMPACT FLYBY SPACECRAFT"),
    (-150, "CASP"),
    (-150, "CASSINI PROBE"),
    (-150, "HUYGENS PROBE"),
    (-151, "AXAF"),
    (-151, "CHANDRA"),
    (-177, "GRAIL-A"),
    (-181, "GRAIL-B"),
    (-202, "MAVEN"),
    (-203, "DAWN"),
    (-226, "ROSETTA"),
    (-227, "KEPLER"),
    (-234, "STEREO AHEAD"),
    (-235, "STEREO BEHIND"),
    (-236, "MESSENGER"),
    (-248, "VEX"),
    (-248, "VENUS EXPRESS"),
    (-253, "MER-1"),
    (-253, "OPPORTUNITY"),
    (-254, "MER-2"),
    (-254, "SPIRIT"),
    (399012, "DSS-12"),
    (399013, "DSS-13"),
    (399014, "DSS-14"),
    (399024, "DSS-24"),
    (399034, "DSS-34"),
    (399043, "DSS-43"),
    (399054, "DSS-54"),
    (399063, "DSS-63"),
    (1000036, "HALLEY"),
    (1000093, "TEMPEL 1"),
    (2000001, "CERES"),
    (2000002, "PALLAS"),
    (2000004, "VESTA"),
    (2000216, "KLEOPATRA"),
    (2000433, "EROS"),
    (2025143, "ITOKAWA"),
    (2101955, "BENNU"),
    (2431010, "IDA"),
    (2431011, "DACTYL"),
    (9511010, "GASPRA"),
];
