fn main() {
    println!("cargo:rerun-if-changed=components/lmic_glue/lmic_glue.cpp");
    println!("cargo:rerun-if-changed=components/lmic_glue/lmic_glue.h");
    println!("cargo:rerun-if-changed=components/lmic_glue/CMakeLists.txt");

    // The LMIC glue component is only built by the ESP-IDF toolchain.
    // Host builds (tests, simulation) skip the sysenv propagation.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
